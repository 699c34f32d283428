use anyhow::Context;
use serde_json::json;
use std::path::Path;

use crate::cli::utils::{
    confirm, output_diff, output_error, output_restaurant, output_restaurants, output_success,
    output_validation, TerminalNotifier,
};
use crate::cli::OutputFormat;
use crate::client::HttpRestaurantClient;
use crate::form::{EditController, LoadOutcome, RestaurantForm, SubmitError};
use crate::middleware::AuthUser;
use crate::models::RestaurantPayload;

pub async fn list(client: &HttpRestaurantClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let restaurants = client.list().await?;
    output_restaurants(&output_format, &restaurants)
}

pub async fn show(
    client: &HttpRestaurantClient,
    id: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let restaurant = client.get(id).await?;
    output_restaurant(&output_format, &restaurant)
}

pub async fn mine(client: &HttpRestaurantClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match client.mine().await? {
        Some(restaurant) => output_restaurant(&output_format, &restaurant),
        None => output_success(
            &output_format,
            "You have no restaurant yet; run `restaurant create` to list one",
            Some(json!({ "data": null })),
        ),
    }
}

pub async fn create(
    caller: Option<AuthUser>,
    client: HttpRestaurantClient,
    file: Option<&Path>,
    pairs: &[String],
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut form = match file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let payload: RestaurantPayload = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid listing", path.display()))?;
            RestaurantForm::from(&payload)
        }
        None => RestaurantForm::default(),
    };
    apply_pairs(&mut form, pairs)?;

    let controller = EditController::new(caller, client, TerminalNotifier { output_format });
    match controller.submit_create(&form).await {
        Ok(created) => output_restaurant(&output_format, &created),
        Err(e) => report_submit_error(&output_format, e),
    }
}

pub async fn edit(
    caller: Option<AuthUser>,
    client: HttpRestaurantClient,
    pairs: &[String],
    yes: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let controller = EditController::new(caller, client, TerminalNotifier { output_format });

    let mut session = match controller.load().await? {
        LoadOutcome::Edit(session) => session,
        LoadOutcome::SignInRequired => {
            return output_error(
                &output_format,
                "Sign in as a restaurant owner first; pass an owner --token",
                Some("UNAUTHORIZED"),
            );
        }
        LoadOutcome::NeedsCreation => {
            return output_error(
                &output_format,
                "You have no restaurant yet; run `restaurant create` first",
                Some("NOT_FOUND"),
            );
        }
    };
    apply_pairs(&mut session.form, pairs)?;

    let confirmation = match session.confirm() {
        Ok(confirmation) => confirmation,
        Err(errors) => return output_validation(&output_format, &errors),
    };

    output_diff(&output_format, &confirmation.diff)?;
    if confirmation.diff.is_unchanged() {
        return Ok(());
    }
    if !yes && !confirm("Submit these changes?")? {
        eprintln!("Nothing submitted");
        return Ok(());
    }

    match controller.submit_edit(confirmation).await {
        Ok(updated) => match output_format {
            OutputFormat::Json => output_restaurant(&output_format, &updated),
            OutputFormat::Text => Ok(()),
        },
        Err(e) => report_submit_error(&output_format, e),
    }
}

pub async fn delete(
    client: &HttpRestaurantClient,
    id: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let removed = client.delete(id).await?;
    output_success(
        &output_format,
        &format!("Deleted {} ({})", removed.name, removed.id),
        Some(json!({ "data": removed })),
    )
}

fn apply_pairs(form: &mut RestaurantForm, pairs: &[String]) -> anyhow::Result<()> {
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected FIELD=VALUE, got '{}'", pair))?;
        form.set(key.trim(), value)?;
    }
    Ok(())
}

fn report_submit_error(output_format: &OutputFormat, err: SubmitError) -> anyhow::Result<()> {
    match err {
        SubmitError::Invalid(errors) => output_validation(output_format, &errors),
        // The notifier already told the user; surface details for --json and the exit code
        SubmitError::Client(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_must_have_an_equals_sign() {
        let mut form = RestaurantForm::default();
        apply_pairs(&mut form, &["name=Chez Nous".to_string()]).unwrap();
        assert_eq!(form.name, "Chez Nous");
        assert!(apply_pairs(&mut form, &["name".to_string()]).is_err());
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let mut form = RestaurantForm::default();
        apply_pairs(&mut form, &["websiteUrl=https://x.test/?a=b".to_string()]).unwrap();
        assert_eq!(form.website_url, "https://x.test/?a=b");
    }
}
