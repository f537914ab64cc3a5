//! Drives the client view models through `HttpTimelineApi` against the real router.

use std::{net::SocketAddr, sync::Arc};

use client::{ClientConfig, ClientError, HttpTimelineApi, ProjectPlanner, TimelineApi};
use db::{
    DBService,
    models::{
        idea::Idea,
        project_task::{CreateProjectTask, TaskStatus, UpdateProjectTask},
        project_timeline::CreateProjectTimeline,
    },
};
use server::{AppState, routes, session::HeaderSessionResolver};
use services::services::config::Config;
use tokio::net::TcpListener;
use uuid::Uuid;

async fn serve() -> (SocketAddr, DBService) {
    let db = DBService::new_in_memory().await.unwrap();
    let state = AppState::new(db.clone(), &Config::default(), Arc::new(HeaderSessionResolver));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes::router(state)).await.unwrap();
    });
    (addr, db)
}

fn api_for(addr: SocketAddr, user: Uuid) -> Arc<HttpTimelineApi> {
    let config = ClientConfig::new(format!("http://{}", addr), user);
    Arc::new(HttpTimelineApi::new(&config).unwrap())
}

#[tokio::test]
async fn test_planner_round_trip_over_http() {
    let (addr, db) = serve().await;
    let owner = Uuid::new_v4();
    let idea = Idea::create(&db.pool, owner, "Neighbourhood tool library").await.unwrap();

    let api = api_for(addr, owner);
    let planner = ProjectPlanner::new(api.clone(), idea.id);
    planner.load().await.unwrap();
    assert!(planner.snapshot().await.phases.is_empty());

    let phase = planner
        .add_phase(&CreateProjectTimeline {
            phase_name: "Pilot".to_string(),
            start_date: "2025-04-01".to_string(),
            end_date: "2025-05-15".to_string(),
            objectives: Some("Lend 50 tools".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(phase.phase_number, 1);

    let task = planner
        .add_task(phase.id, &CreateProjectTask::weighted("Inventory", 60, 50))
        .await
        .unwrap();
    assert_eq!(planner.snapshot().await.progress_of(phase.id), Some(30));

    let updated = planner
        .set_task_status(phase.id, task.id, TaskStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated.completion_percentage, 100);
    let snapshot = planner.snapshot().await;
    assert_eq!(snapshot.progress_of(phase.id), Some(60));
    assert_eq!(snapshot.tasks_of(phase.id)[0].status, TaskStatus::Completed);
    assert!(snapshot.error.is_none());

    // Absent fields are not sent; `Some(None)` goes out as `null` and clears.
    let assigned = api
        .update_task(
            idea.id,
            phase.id,
            &UpdateProjectTask {
                id: task.id,
                assigned_to: Some(Some(owner)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(assigned.assigned_to, Some(owner));
    assert_eq!(assigned.status, TaskStatus::Completed);

    let cleared = api
        .update_task(
            idea.id,
            phase.id,
            &UpdateProjectTask {
                id: task.id,
                assigned_to: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.assigned_to.is_none());

    let err = api
        .delete_task(idea.id, phase.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Api {
            status: 404,
            message: "Task not found".to_string(),
        }
    );

    planner.delete_task(phase.id, task.id).await.unwrap();
    let snapshot = planner.snapshot().await;
    assert!(snapshot.tasks_of(phase.id).is_empty());
    assert_eq!(snapshot.progress_of(phase.id), Some(60));
}

#[tokio::test]
async fn test_non_owner_gets_forbidden_over_http() {
    let (addr, db) = serve().await;
    let owner = Uuid::new_v4();
    let idea = Idea::create(&db.pool, owner, "Pet sitting app").await.unwrap();

    let owner_planner = ProjectPlanner::new(api_for(addr, owner), idea.id);
    let phase = owner_planner
        .add_phase(&CreateProjectTimeline {
            phase_name: "Launch".to_string(),
            start_date: "2025-06-01".to_string(),
            end_date: "2025-07-01".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let task = owner_planner
        .add_task(phase.id, &CreateProjectTask::weighted("Flyers", 100, 0))
        .await
        .unwrap();

    let stranger = api_for(addr, Uuid::new_v4());
    let err = stranger
        .update_task(
            idea.id,
            phase.id,
            &UpdateProjectTask::status_change(task.id, TaskStatus::Completed),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Api {
            status: 403,
            message: "You do not have permission to modify this idea".to_string(),
        }
    );

    let stranger_planner = ProjectPlanner::new(stranger, idea.id);
    let err = stranger_planner.load().await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 403, .. }));
    assert_eq!(
        stranger_planner.snapshot().await.error.as_deref(),
        Some("You do not have permission to modify this idea")
    );

    owner_planner.load().await.unwrap();
    let snapshot = owner_planner.snapshot().await;
    assert_eq!(snapshot.tasks_of(phase.id)[0].status, TaskStatus::Pending);
    assert_eq!(snapshot.progress_of(phase.id), Some(0));
}
