mod common;

use std::sync::Mutex;

use common::Harness;
use restaurant_api::form::{
    EditController, LoadOutcome, Notifier, RestaurantForm, SubmitError, NO_DIFF_MESSAGE,
};
use restaurant_api::middleware::AuthUser;
use restaurant_api::types::Role;
use uuid::Uuid;

#[derive(Default)]
struct Toasts {
    shown: Mutex<Vec<String>>,
}

impl Notifier for Toasts {
    fn success(&self, title: &str, _message: &str) {
        self.shown.lock().unwrap().push(format!("ok: {}", title));
    }

    fn error(&self, title: &str, _message: &str) {
        self.shown.lock().unwrap().push(format!("error: {}", title));
    }
}

fn signed_in(id: Uuid, access: Role) -> Option<AuthUser> {
    Some(AuthUser { id, access })
}

#[tokio::test]
async fn customers_never_reach_the_edit_form() {
    let h = Harness::new();
    let (user, token) = h.customer();
    let controller = EditController::new(
        signed_in(user, Role::Customer),
        h.api(token),
        Toasts::default(),
    );
    assert!(matches!(
        controller.load().await.unwrap(),
        LoadOutcome::SignInRequired
    ));

    let (_, token) = h.owner();
    let anonymous = EditController::new(None, h.api(token), Toasts::default());
    assert!(matches!(
        anonymous.load().await.unwrap(),
        LoadOutcome::SignInRequired
    ));
}

#[tokio::test]
async fn new_owner_is_sent_to_the_create_flow() {
    let h = Harness::new();
    let (user, token) = h.owner();
    let controller = EditController::new(
        signed_in(user, Role::Owner),
        h.api(token),
        Toasts::default(),
    );

    assert!(matches!(
        controller.load().await.unwrap(),
        LoadOutcome::NeedsCreation
    ));

    let mut form = RestaurantForm::default();
    form.set("category", "Japanese").unwrap();
    form.set("location", "Saket").unwrap();
    form.set("address", "1 Press Enclave Marg").unwrap();
    form.set("timeOpen", "11:00").unwrap();
    form.set("timeClose", "23:00").unwrap();

    let created = controller.submit_create(&form).await.unwrap();
    assert_eq!(created.time_open, 1100);
    assert_eq!(created.max_pax, 10);

    assert!(matches!(
        controller.load().await.unwrap(),
        LoadOutcome::Edit(_)
    ));
}

#[tokio::test]
async fn edit_previews_changes_then_saves() {
    let h = Harness::new();
    let (user, token) = h.owner();
    let id = h.create_sample(&token).await;
    let controller = EditController::new(
        signed_in(user, Role::Owner),
        h.api(token),
        Toasts::default(),
    );

    let mut session = match controller.load().await.unwrap() {
        LoadOutcome::Edit(session) => session,
        other => panic!("listing exists, got {:?}", other),
    };
    assert_eq!(session.rest_id.to_string(), id);
    assert_eq!(session.form.time_open, "09:30");

    // Reordering closed days is not a change
    session.form.days_close = vec!["Tuesday".into(), "Monday".into()];
    assert_eq!(session.confirm().unwrap().diff.render(), NO_DIFF_MESSAGE);

    session.form.time_close = "23:30".into();
    session.form.max_pax = 40;
    let confirmation = session.confirm().unwrap();
    assert_eq!(
        confirmation.diff.render(),
        "- Closing Time: 23:30\n- Maximum Pax: 40"
    );

    let updated = controller.submit_edit(confirmation).await.unwrap();
    assert_eq!(updated.time_close, 2330);
    assert_eq!(updated.max_pax, 40);

    let (_, stored) = h.get(&format!("/restaurant/{}", id), None).await;
    assert_eq!(stored["data"]["timeClose"], 2330);
}

#[tokio::test]
async fn oversized_description_is_stopped_locally() {
    let h = Harness::new();
    let (user, token) = h.owner();
    h.create_sample(&token).await;
    let controller = EditController::new(
        signed_in(user, Role::Owner),
        h.api(token),
        Toasts::default(),
    );

    let LoadOutcome::Edit(mut session) = controller.load().await.unwrap() else {
        panic!("listing exists");
    };
    session.form.description = "d".repeat(501);

    let errors = session.confirm().unwrap_err();
    assert_eq!(
        errors.get("description"),
        Some("Please enter less than 500 characters")
    );
}

#[tokio::test]
async fn server_rejections_become_a_generic_toast() {
    let h = Harness::new();
    let (user, token) = h.owner();
    h.create_sample(&token).await;

    // Same owner creating again hits the one-listing rule
    let controller = EditController::new(
        signed_in(user, Role::Owner),
        h.api(token),
        Toasts::default(),
    );
    let mut form = RestaurantForm::default();
    form.set("category", "Asian").unwrap();
    form.set("location", "Rohini").unwrap();
    form.set("address", "Sector 10").unwrap();
    form.set("timeOpen", "10:00").unwrap();
    form.set("timeClose", "20:00").unwrap();

    let result = controller.submit_create(&form).await;
    assert!(matches!(result, Err(SubmitError::Client(_))));
}
