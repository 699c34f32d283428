use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::fields::{diff, Diff};
use super::RestaurantForm;
use crate::client::ClientError;
use crate::middleware::AuthUser;
use crate::models::{Restaurant, RestaurantPatch, RestaurantPayload, ValidationErrors};
use crate::types::Role;

pub const EDIT_SUCCESS_TITLE: &str = "Restaurant Info Successfully Updated!";
pub const CREATE_SUCCESS_TITLE: &str = "Restaurant Successfully Created!";
pub const SUCCESS_MESSAGE: &str = "Your restaurant is now listed and available for reservations";
pub const ERROR_TITLE: &str = "Something went wrong";
pub const ERROR_MESSAGE: &str = "Please try again later";

/// The server calls the form needs.
#[async_trait]
pub trait RestaurantApi: Send + Sync {
    /// The caller's listing, `None` if they have not created one.
    async fn fetch_mine(&self) -> Result<Option<Restaurant>, ClientError>;

    async fn create(&self, payload: &RestaurantPayload) -> Result<Restaurant, ClientError>;

    async fn edit(
        &self,
        rest_id: Uuid,
        payload: &RestaurantPayload,
    ) -> Result<Restaurant, ClientError>;
}

/// User-facing feedback after a submission.
pub trait Notifier: Send + Sync {
    fn success(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form is invalid: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug)]
pub enum LoadOutcome {
    Edit(EditSession),
    /// No signed-in owner; go to sign-in.
    SignInRequired,
    /// The owner has no listing yet; go to the create flow.
    NeedsCreation,
}

/// A form opened on an existing listing, remembering what the server had.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub rest_id: Uuid,
    pub form: RestaurantForm,
    prior: RestaurantPatch,
}

impl EditSession {
    pub fn new(record: &Restaurant) -> Self {
        Self {
            rest_id: record.id,
            form: RestaurantForm::from_record(record),
            prior: RestaurantPatch::from(record),
        }
    }

    /// Validate the form and work out what changed. No network traffic.
    pub fn confirm(&self) -> Result<Confirmation, ValidationErrors> {
        let payload = self.form.to_payload()?;
        let diff = diff(&payload, &self.prior);

        Ok(Confirmation {
            rest_id: self.rest_id,
            payload,
            diff,
        })
    }
}

/// A validated edit waiting for the owner to accept it.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub rest_id: Uuid,
    pub payload: RestaurantPayload,
    pub diff: Diff,
}

pub struct EditController<A, N> {
    caller: Option<AuthUser>,
    api: A,
    notifier: N,
}

impl<A: RestaurantApi, N: Notifier> EditController<A, N> {
    /// `caller` is the signed-in user, if any.
    pub fn new(caller: Option<AuthUser>, api: A, notifier: N) -> Self {
        Self {
            caller,
            api,
            notifier,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch the owner's listing and open it for editing.
    ///
    /// Anyone but a signed-in owner is sent to sign-in before any request is made.
    pub async fn load(&self) -> Result<LoadOutcome, ClientError> {
        match &self.caller {
            Some(caller) if caller.access == Role::Owner => {}
            _ => {
                tracing::info!("Restaurant editing needs a signed-in owner");
                return Ok(LoadOutcome::SignInRequired);
            }
        }

        match self.api.fetch_mine().await {
            Ok(Some(record)) => Ok(LoadOutcome::Edit(EditSession::new(&record))),
            Ok(None) => {
                tracing::info!("No restaurant on record yet; switching to the create flow");
                Ok(LoadOutcome::NeedsCreation)
            }
            Err(e) => {
                tracing::error!("Failed to load restaurant: {}", e);
                Err(e)
            }
        }
    }

    /// Send the accepted edit. The whole payload goes out, not just the diff.
    pub async fn submit_edit(&self, confirmation: Confirmation) -> Result<Restaurant, SubmitError> {
        match self.api.edit(confirmation.rest_id, &confirmation.payload).await {
            Ok(updated) => {
                self.notifier.success(EDIT_SUCCESS_TITLE, SUCCESS_MESSAGE);
                Ok(updated)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Validate a new listing locally, then create it.
    pub async fn submit_create(&self, form: &RestaurantForm) -> Result<Restaurant, SubmitError> {
        let payload = form.to_payload()?;

        match self.api.create(&payload).await {
            Ok(created) => {
                self.notifier.success(CREATE_SUCCESS_TITLE, SUCCESS_MESSAGE);
                Ok(created)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    // Details go to the log; the user only sees a generic message.
    fn report(&self, err: ClientError) -> SubmitError {
        tracing::error!("Restaurant submission failed: {}", err);
        self.notifier.error(ERROR_TITLE, ERROR_MESSAGE);
        SubmitError::Client(err)
    }
}
