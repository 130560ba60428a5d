use super::Route;
use crate::contract::{BoardConnector, Receipt};
use crate::form::{Field, FormErrors, TaskForm};
use crate::gateway::ContractGateway;

/// What became of a submit press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// No wallet connected, nothing happened.
    NotConnected,
    /// Field errors were set on the page.
    Invalid,
    /// The gateway already notified the failure; the form keeps its contents.
    Failed,
    Created { receipt: Receipt, redirect: Route },
}

/// `/post`: the task creation form.
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    form: TaskForm,
    errors: FormErrors,
    loading: bool,
}

impl PostPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Typing into a field clears its error.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
        self.errors.clear(field);
    }

    pub async fn submit<C: BoardConnector>(&mut self, gateway: &ContractGateway<C>) -> Submission {
        if gateway.connection().account().is_none() {
            return Submission::NotConnected;
        }
        let task = match self.form.validate() {
            Ok(task) => task,
            Err(errors) => {
                self.errors = errors;
                return Submission::Invalid;
            }
        };

        self.loading = true;
        let result = gateway
            .create_task(&task.title, &task.description, task.reward)
            .await;
        self.loading = false;

        match result {
            Ok(receipt) => {
                self.form = TaskForm::default();
                self.errors = FormErrors::default();
                Submission::Created {
                    receipt,
                    redirect: Route::Tasks,
                }
            }
            Err(_) => Submission::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_clears_field_error() {
        let mut page = PostPage::new();
        page.errors = TaskForm::new("ab", "short", "").validate().unwrap_err();
        page.edit(Field::Title, "A better title");
        assert!(page.errors().title.is_none());
        assert!(page.errors().description.is_some());
        assert!(page.errors().reward.is_some());
        assert_eq!(page.form().title, "A better title");
    }
}
