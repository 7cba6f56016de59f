//! Project board: status columns, drag gating and optimistic moves
//!
//! A [`BoardController`] holds the tasks of one project grouped into the
//! three status columns. Moving a task between columns is optimistic: the
//! local status changes first, then the remote update is issued, and a
//! failed update restores the previous status.
//!
//! # Move State Machine
//!
//! ```text
//!                    remote ok
//!   Pending(original) ─────────▶ Committed
//!          │
//!          │ remote error
//!          ▼
//!   RolledBack(original)
//! ```
//!
//! Drops that would not change anything (same column, unknown column,
//! unknown task) never reach the state machine and issue no remote call.
//!
//! # Drag Activation
//!
//! A [`DragSensor`] decides whether a gesture becomes a drag. Pointer
//! gestures activate after 8 px of movement. Touch gestures activate once
//! held for 250 ms without moving more than 5 px; moving further before
//! then cancels the gesture so the page can scroll.
//!
//! # Example
//!
//! ```no_run
//! use taskboard_shared::board::{BoardController, DropOutcome};
//! use taskboard_shared::notice::Notices;
//! # use taskboard_shared::api::Api;
//!
//! # async fn example(api: Api, user_id: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let mut board = BoardController::load(&api, "65a1f0c2b3d4e5f60718", user_id).await?;
//! let mut notices = Notices::new();
//!
//! let task_id = board.tasks()[0].id.clone();
//! board.begin_drag(&task_id)?;
//! match board.complete_drag(&api, &task_id, "ongoing", &mut notices).await? {
//!     DropOutcome::Committed { .. } => println!("moved"),
//!     DropOutcome::RolledBack { .. } => println!("restored"),
//!     DropOutcome::Ignored => {}
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::api::Api;
use crate::models::{NewTask, Project, Task, TaskStatus};
use crate::notice::Notices;
use crate::remote::{RemoteError, RemoteResult};

/// Pointer movement that activates a drag
pub const POINTER_ACTIVATION_DISTANCE: f64 = 8.0;

/// How long a touch must be held before it activates a drag
pub const TOUCH_ACTIVATION_DELAY_MS: u64 = 250;

/// Touch movement allowed while waiting for the delay
pub const TOUCH_TOLERANCE: f64 = 5.0;

/// Board errors
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Only the project owner may rearrange or delete tasks
    #[error("Only the project owner can change this board")]
    NotOwner,

    #[error("{0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Input device of a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Pointer,
    Touch,
}

/// Where a gesture stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Not decided yet
    Pending,

    /// The gesture is a drag
    Active,

    /// The gesture will never become a drag
    Cancelled,
}

/// One observation of a gesture, relative to where it started
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureSample {
    pub dx: f64,
    pub dy: f64,
    pub elapsed_ms: u64,
}

impl GestureSample {
    pub fn distance(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

/// Decides whether a gesture activates a drag
#[derive(Debug, Clone, Copy)]
pub struct DragSensor {
    input: InputKind,
    state: Activation,
}

impl DragSensor {
    pub fn new(input: InputKind) -> Self {
        Self {
            input,
            state: Activation::Pending,
        }
    }

    pub fn pointer() -> Self {
        Self::new(InputKind::Pointer)
    }

    pub fn touch() -> Self {
        Self::new(InputKind::Touch)
    }

    pub fn state(&self) -> Activation {
        self.state
    }

    /// Feeds one sample; once active or cancelled the state is final
    pub fn track(&mut self, sample: GestureSample) -> Activation {
        if self.state != Activation::Pending {
            return self.state;
        }

        self.state = match self.input {
            InputKind::Pointer => {
                if sample.distance() > POINTER_ACTIVATION_DISTANCE {
                    Activation::Active
                } else {
                    Activation::Pending
                }
            }
            InputKind::Touch => {
                if sample.elapsed_ms >= TOUCH_ACTIVATION_DELAY_MS {
                    Activation::Active
                } else if sample.distance() > TOUCH_TOLERANCE {
                    Activation::Cancelled
                } else {
                    Activation::Pending
                }
            }
        };

        self.state
    }

    /// Runs a whole gesture through a fresh sensor
    pub fn evaluate(input: InputKind, samples: &[GestureSample]) -> Activation {
        let mut sensor = Self::new(input);
        for sample in samples {
            if sensor.track(*sample) != Activation::Pending {
                break;
            }
        }
        sensor.state()
    }
}

/// State of one optimistic move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    /// Applied locally, remote update in flight
    Pending { original: TaskStatus },

    /// Remote update succeeded
    Committed,

    /// Remote update failed, `original` restored
    RolledBack { original: TaskStatus },
}

impl MoveState {
    /// Resolves a pending move with the remote outcome
    pub fn resolve<T>(self, remote: &RemoteResult<T>) -> MoveState {
        match (self, remote) {
            (MoveState::Pending { .. }, Ok(_)) => MoveState::Committed,
            (MoveState::Pending { original }, Err(_)) => MoveState::RolledBack { original },
            (settled, _) => settled,
        }
    }
}

/// Result of dropping a task on a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    /// Nothing to do: same column, unknown column or unknown task
    Ignored,

    Committed {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
    },

    RolledBack {
        task_id: String,
        status: TaskStatus,
    },
}

/// Per-status task counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub not_started: usize,
    pub ongoing: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::NotStarted => counts.not_started += 1,
                TaskStatus::Ongoing => counts.ongoing += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }

    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::NotStarted => self.not_started,
            TaskStatus::Ongoing => self.ongoing,
            TaskStatus::Completed => self.completed,
        }
    }

    pub fn total(&self) -> usize {
        self.not_started + self.ongoing + self.completed
    }
}

/// One status column
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub id: TaskStatus,
    pub title: &'static str,
    pub count: usize,
    pub tasks: Vec<Task>,
}

/// Board of one project, as seen by one viewer
#[derive(Debug, Clone)]
pub struct BoardController {
    project: Project,
    tasks: Vec<Task>,
    active: Option<String>,
    is_owner: bool,
}

impl BoardController {
    pub fn new(project: Project, tasks: Vec<Task>, viewer_id: &str) -> Self {
        let is_owner = project.is_owned_by(viewer_id);
        Self {
            project,
            tasks,
            active: None,
            is_owner,
        }
    }

    /// Fetches the project and its tasks
    ///
    /// A missing project is an error; a failed task listing yields an
    /// empty board.
    pub async fn load(api: &Api, project_id: &str, viewer_id: &str) -> RemoteResult<Self> {
        let project = api.project(project_id).await?;
        let tasks = api.project_tasks(project_id).await;
        Ok(Self::new(project, tasks, viewer_id))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    /// The task being dragged
    pub fn active_task(&self) -> Option<&Task> {
        self.active.as_deref().and_then(|id| self.task(id))
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.tasks)
    }

    /// Tasks grouped by status, in column order
    pub fn columns(&self) -> Vec<Column> {
        TaskStatus::ALL
            .into_iter()
            .map(|status| {
                let tasks: Vec<Task> = self
                    .tasks
                    .iter()
                    .filter(|task| task.status == status)
                    .cloned()
                    .collect();
                Column {
                    id: status,
                    title: status.title(),
                    count: tasks.len(),
                    tasks,
                }
            })
            .collect()
    }

    fn require_owner(&self) -> Result<(), BoardError> {
        if self.is_owner {
            Ok(())
        } else {
            Err(BoardError::NotOwner)
        }
    }

    /// Marks a task as being dragged; unknown ids are ignored
    pub fn begin_drag(&mut self, task_id: &str) -> Result<(), BoardError> {
        self.require_owner()?;

        if self.task(task_id).is_some() {
            self.active = Some(task_id.to_string());
        }
        Ok(())
    }

    pub fn cancel_drag(&mut self) {
        self.active = None;
    }

    /// Drops a task on the column named `destination`
    ///
    /// The local status changes before the remote update is issued. A
    /// failed update restores the previous status and pushes exactly one
    /// error notice. The active task is cleared in every case.
    pub async fn complete_drag(
        &mut self,
        api: &Api,
        task_id: &str,
        destination: &str,
        notices: &mut Notices,
    ) -> Result<DropOutcome, BoardError> {
        self.require_owner()?;
        self.active = None;

        let Ok(target) = destination.parse::<TaskStatus>() else {
            tracing::debug!(task_id = %task_id, destination = %destination, "Drop outside a status column");
            return Ok(DropOutcome::Ignored);
        };

        let Some(index) = self.tasks.iter().position(|task| task.id == task_id) else {
            return Ok(DropOutcome::Ignored);
        };

        let original = self.tasks[index].status;
        if original == target {
            return Ok(DropOutcome::Ignored);
        }

        self.tasks[index].status = target;
        let pending = MoveState::Pending { original };

        let remote = api.update_task_status(task_id, target).await;

        match pending.resolve(&remote) {
            MoveState::RolledBack { original } => {
                if let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) {
                    task.status = original;
                }
                notices.error("Failed to update task status");
                Ok(DropOutcome::RolledBack {
                    task_id: task_id.to_string(),
                    status: original,
                })
            }
            _ => {
                if let Ok(updated) = remote {
                    if let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) {
                        task.updated_at = updated.updated_at;
                    }
                }
                notices.success(format!("Task moved to {}", target.label()));
                tracing::info!(task_id = %task_id, from = %original, to = %target, "Task moved");
                Ok(DropOutcome::Committed {
                    task_id: task_id.to_string(),
                    from: original,
                    to: target,
                })
            }
        }
    }

    /// Creates a task in this project and appends it to the board
    pub async fn create_task(
        &mut self,
        api: &Api,
        mut task: NewTask,
        notices: &mut Notices,
    ) -> Result<Task, BoardError> {
        if task.title.trim().is_empty() {
            notices.error("Task title is required");
            return Err(BoardError::Validation("Task title is required".to_string()));
        }

        task.project_id = self.project.id.clone();
        task.status = TaskStatus::NotStarted;

        match api.create_task(&task).await {
            Ok(created) => {
                self.tasks.push(created.clone());
                notices.success("Task created successfully");
                Ok(created)
            }
            Err(e) => {
                notices.error("Failed to create task");
                Err(e.into())
            }
        }
    }

    /// Deletes a task and removes it from the board
    pub async fn delete_task(
        &mut self,
        api: &Api,
        task_id: &str,
        notices: &mut Notices,
    ) -> Result<(), BoardError> {
        self.require_owner()?;

        if self.task(task_id).is_none() {
            return Err(BoardError::TaskNotFound(task_id.to_string()));
        }

        match api.delete_task(task_id).await {
            Ok(()) => {
                self.tasks.retain(|task| task.id != task_id);
                if self.active.as_deref() == Some(task_id) {
                    self.active = None;
                }
                notices.success("Task deleted successfully");
                Ok(())
            }
            Err(e) => {
                notices.error("Failed to delete task");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProject;
    use crate::notice::NoticeLevel;
    use crate::remote::{Collection, MemoryBackend, Operation};
    use std::sync::Arc;

    fn sample(dx: f64, dy: f64, elapsed_ms: u64) -> GestureSample {
        GestureSample { dx, dy, elapsed_ms }
    }

    async fn board_with_task() -> (MemoryBackend, Api, BoardController, String) {
        let backend = MemoryBackend::new();
        let api = Api::with_log_mailer(Arc::new(backend.clone()));
        api.create_user_account("Ada", "ada@example.com", "password123")
            .await
            .unwrap();
        api.sign_in("ada@example.com", "password123").await.unwrap();
        let user = api.current_user().await.unwrap();

        let project = api
            .create_project(&NewProject {
                name: "Launch".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();

        let mut board = BoardController::load(&api, &project.id, &user.id)
            .await
            .unwrap();
        let task = board
            .create_task(&api, NewTask::new("", "Write copy"), &mut Notices::new())
            .await
            .unwrap();

        (backend, api, board, task.id)
    }

    #[test]
    fn test_pointer_activates_beyond_eight_pixels() {
        let mut sensor = DragSensor::pointer();
        assert_eq!(sensor.track(sample(3.0, 4.0, 10)), Activation::Pending);
        assert_eq!(sensor.track(sample(8.0, 0.0, 20)), Activation::Pending);
        assert_eq!(sensor.track(sample(8.01, 0.0, 30)), Activation::Active);
    }

    #[test]
    fn test_touch_needs_hold() {
        let gesture = [sample(1.0, 1.0, 100), sample(2.0, 2.0, 250)];
        assert_eq!(DragSensor::evaluate(InputKind::Touch, &gesture), Activation::Active);
    }

    #[test]
    fn test_touch_moving_early_is_a_scroll() {
        let gesture = [sample(0.0, 6.0, 100), sample(0.0, 6.0, 300)];
        assert_eq!(
            DragSensor::evaluate(InputKind::Touch, &gesture),
            Activation::Cancelled
        );
    }

    #[test]
    fn test_touch_within_tolerance_keeps_waiting() {
        let mut sensor = DragSensor::touch();
        assert_eq!(sensor.track(sample(3.0, 4.0, 249)), Activation::Pending);
    }

    #[test]
    fn test_move_state_resolution() {
        let pending = MoveState::Pending {
            original: TaskStatus::NotStarted,
        };
        let ok: RemoteResult<()> = Ok(());
        let err: RemoteResult<()> = Err(RemoteError::Transport("down".to_string()));

        assert_eq!(pending.resolve(&ok), MoveState::Committed);
        assert_eq!(
            pending.resolve(&err),
            MoveState::RolledBack {
                original: TaskStatus::NotStarted
            }
        );
        assert_eq!(MoveState::Committed.resolve(&err), MoveState::Committed);
    }

    #[tokio::test]
    async fn test_drag_to_ongoing_commits() {
        let (backend, api, mut board, task_id) = board_with_task().await;
        let mut notices = Notices::new();

        board.begin_drag(&task_id).unwrap();
        assert!(board.active_task().is_some());

        let outcome = board
            .complete_drag(&api, &task_id, "ongoing", &mut notices)
            .await
            .unwrap();

        assert!(matches!(outcome, DropOutcome::Committed { to: TaskStatus::Ongoing, .. }));
        assert!(board.active_task().is_none());
        assert_eq!(board.counts().not_started, 0);
        assert_eq!(board.counts().ongoing, 1);
        assert_eq!(backend.documents(Collection::Tasks)[0]["status"], "ongoing");

        let drained = notices.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].message, "Task moved to ongoing");
    }

    #[tokio::test]
    async fn test_drop_on_same_column_is_a_no_op() {
        let (backend, api, mut board, task_id) = board_with_task().await;
        let mut notices = Notices::new();
        let before = backend.count_calls(Operation::Update, Collection::Tasks);

        let outcome = board
            .complete_drag(&api, &task_id, "not_started", &mut notices)
            .await
            .unwrap();

        assert_eq!(outcome, DropOutcome::Ignored);
        assert_eq!(backend.count_calls(Operation::Update, Collection::Tasks), before);
        assert!(notices.is_empty());
    }

    #[tokio::test]
    async fn test_drop_on_unknown_column_is_a_no_op() {
        let (backend, api, mut board, task_id) = board_with_task().await;
        let mut notices = Notices::new();

        for destination in ["done", "", "Ongoing", task_id.as_str()] {
            let outcome = board
                .complete_drag(&api, &task_id, destination, &mut notices)
                .await
                .unwrap();
            assert_eq!(outcome, DropOutcome::Ignored);
        }

        assert_eq!(backend.count_calls(Operation::Update, Collection::Tasks), 0);
        assert_eq!(board.tasks()[0].status, TaskStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_with_one_notice() {
        let (backend, api, mut board, task_id) = board_with_task().await;
        let mut notices = Notices::new();
        backend.fail_next(Operation::Update, Collection::Tasks, 1);

        let outcome = board
            .complete_drag(&api, &task_id, "completed", &mut notices)
            .await
            .unwrap();

        assert!(matches!(outcome, DropOutcome::RolledBack { status: TaskStatus::NotStarted, .. }));
        assert_eq!(board.task(&task_id).unwrap().status, TaskStatus::NotStarted);
        assert_eq!(notices.count(NoticeLevel::Error), 1);
        assert_eq!(notices.pending().len(), 1);
        assert_eq!(backend.documents(Collection::Tasks)[0]["status"], "not_started");
    }

    #[tokio::test]
    async fn test_non_owner_cannot_drag_or_delete() {
        let (backend, api, board, task_id) = board_with_task().await;
        let mut viewer = BoardController::new(
            board.project().clone(),
            board.tasks().to_vec(),
            "someone-else",
        );
        let mut notices = Notices::new();

        assert!(matches!(viewer.begin_drag(&task_id), Err(BoardError::NotOwner)));
        assert!(matches!(
            viewer.complete_drag(&api, &task_id, "ongoing", &mut notices).await,
            Err(BoardError::NotOwner)
        ));
        assert!(matches!(
            viewer.delete_task(&api, &task_id, &mut notices).await,
            Err(BoardError::NotOwner)
        ));
        assert_eq!(backend.count_calls(Operation::Update, Collection::Tasks), 0);
        assert_eq!(viewer.tasks()[0].status, TaskStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let (backend, api, mut board, _) = board_with_task().await;
        let mut notices = Notices::new();

        let result = board
            .create_task(&api, NewTask::new("", "   "), &mut notices)
            .await;

        assert!(matches!(result, Err(BoardError::Validation(_))));
        assert_eq!(backend.count_calls(Operation::Create, Collection::Tasks), 1);
        assert_eq!(notices.count(NoticeLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_delete_task_updates_columns() {
        let (_, api, mut board, task_id) = board_with_task().await;
        let mut notices = Notices::new();

        board.delete_task(&api, &task_id, &mut notices).await.unwrap();

        assert!(board.tasks().is_empty());
        assert!(board.columns().iter().all(|column| column.count == 0));
    }

    #[test]
    fn test_columns_in_order() {
        let project: Project = serde_json::from_value(serde_json::json!({
            "$id": "p1",
            "name": "Launch",
            "userId": "u1",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        let board = BoardController::new(project, Vec::new(), "u1");

        let ids: Vec<TaskStatus> = board.columns().iter().map(|c| c.id).collect();
        assert_eq!(ids, TaskStatus::ALL.to_vec());
        assert_eq!(board.columns()[0].title, "Not Started");
        assert!(board.is_owner());
    }
}
