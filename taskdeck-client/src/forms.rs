/// Form controllers
///
/// A [`FormController`] owns the field state of one form, the errors of the
/// last submission and an in-flight flag. Submitting validates locally first;
/// an invalid input never reaches the network. While a submission is in
/// flight a second one is refused.
///
/// ```text
/// edit ──► submit ──► check() ──Err──► field errors stored
///                        │
///                        Ok
///                        ▼
///                   in flight ──► mutation ──Ok──► input reset
///                                     │
///                                     Err ──► input kept, error stored
/// ```

use parking_lot::Mutex;
use std::future::Future;
use taskdeck_shared::models::{
    Comment, EntityId, OrgScope, Project, ProjectScope, Task, User,
};
use taskdeck_shared::graphql::operations::SignupPayload;
use taskdeck_shared::validation::{
    CommentInput, FieldErrors, FormInput, LoginInput, ProjectInput, SignupInput, TaskInput,
};
use tracing::debug;

use crate::client::DataClient;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

pub type LoginForm = FormController<LoginInput>;
pub type SignupForm = FormController<SignupInput>;
pub type ProjectForm = FormController<ProjectInput>;
pub type TaskForm = FormController<TaskInput>;
pub type CommentForm = FormController<CommentInput>;

struct FormState<I> {
    input: I,
    field_errors: FieldErrors,
    error: Option<ClientError>,
    in_flight: bool,
}

/// Clears the in-flight flag even if the submission future is dropped
struct InFlight<'a, I>(&'a Mutex<FormState<I>>);

impl<I> Drop for InFlight<'_, I> {
    fn drop(&mut self) {
        self.0.lock().in_flight = false;
    }
}

/// Field state and submission lifecycle of one form
pub struct FormController<I: FormInput> {
    state: Mutex<FormState<I>>,
}

impl<I: FormInput> Default for FormController<I> {
    fn default() -> Self {
        Self::with_input(I::default())
    }
}

impl<I: FormInput> FormController<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from prefilled fields, e.g. when editing
    pub fn with_input(input: I) -> Self {
        Self {
            state: Mutex::new(FormState {
                input,
                field_errors: FieldErrors::new(),
                error: None,
                in_flight: false,
            }),
        }
    }

    /// Current field values
    pub fn input(&self) -> I {
        self.state.lock().input.clone()
    }

    /// Replaces all field values
    pub fn set_input(&self, input: I) {
        self.state.lock().input = input;
    }

    /// Changes field values in place
    pub fn edit<F: FnOnce(&mut I)>(&self, change: F) {
        change(&mut self.state.lock().input);
    }

    /// Field errors from the last submission
    pub fn field_errors(&self) -> FieldErrors {
        self.state.lock().field_errors.clone()
    }

    /// Error from the last submission
    pub fn error(&self) -> Option<ClientError> {
        self.state.lock().error.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Validates and, if valid, runs `send` with the normalized input
    ///
    /// `send` is expected to issue exactly one mutation. On success the
    /// fields reset to their defaults; on failure they are kept.
    pub async fn submit<T, F, Fut>(&self, send: F) -> ClientResult<T>
    where
        F: FnOnce(I) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let checked = {
            let mut state = self.state.lock();
            if state.in_flight {
                return Err(ClientError::SubmitInFlight);
            }

            match state.input.check() {
                Ok(checked) => {
                    state.field_errors = FieldErrors::new();
                    state.error = None;
                    state.in_flight = true;
                    checked
                }
                Err(errors) => {
                    debug!(fields = errors.len(), "form rejected locally");
                    let err = ClientError::Validation(errors.clone());
                    state.field_errors = errors;
                    state.error = Some(err.clone());
                    return Err(err);
                }
            }
        };

        let guard = InFlight(&self.state);
        let result = send(checked).await;
        drop(guard);

        let mut state = self.state.lock();
        match &result {
            Ok(_) => state.input = I::default(),
            Err(err) => {
                state.field_errors = err.field_errors().cloned().unwrap_or_default();
                state.error = Some(err.clone());
            }
        }
        result
    }
}

impl FormController<LoginInput> {
    pub async fn submit_login(&self, session: &SessionStore) -> ClientResult<User> {
        self.submit(|input| async move { session.login(&input).await }).await
    }
}

impl FormController<SignupInput> {
    pub async fn submit_signup(&self, session: &SessionStore) -> ClientResult<SignupPayload> {
        self.submit(|input| async move { session.signup(&input).await }).await
    }
}

impl FormController<ProjectInput> {
    /// Creates a project, or updates `editing` when given
    pub async fn submit_project(
        &self,
        client: &DataClient,
        org: &OrgScope,
        editing: Option<&EntityId>,
    ) -> ClientResult<Project> {
        self.submit(|input| async move {
            match editing {
                Some(id) => client.update_project(org, id, input.fields()).await,
                None => client.create_project(org, input.fields()).await,
            }
        })
        .await
    }
}

impl FormController<TaskInput> {
    /// Creates a task; the assignee falls back to `creator_email`
    pub async fn submit_task(
        &self,
        client: &DataClient,
        scope: &ProjectScope,
        creator_email: &str,
    ) -> ClientResult<Task> {
        self.submit(|mut input| async move {
            if input.assignee_email.is_none() && !creator_email.is_empty() {
                input.assignee_email = Some(creator_email.to_string());
            }
            client.create_task(scope, &input).await
        })
        .await
    }

    /// Sends the form fields as a partial update of task `id`
    ///
    /// Prefill the form with [`TaskInput::from_task`] so untouched fields
    /// go out unchanged.
    pub async fn submit_task_edit(
        &self,
        client: &DataClient,
        scope: &ProjectScope,
        id: &EntityId,
    ) -> ClientResult<Task> {
        self.submit(|input| async move { client.update_task(scope, id, input.patch()).await })
            .await
    }
}

impl FormController<CommentInput> {
    pub async fn submit_comment(
        &self,
        client: &DataClient,
        scope: &ProjectScope,
        task_id: &EntityId,
        author_email: &str,
    ) -> ClientResult<Comment> {
        self.submit(|input| async move {
            client
                .add_comment(scope, task_id, &input.content, author_email)
                .await
        })
        .await
    }
}
