use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::debug;

/// One button of a choice prompt. Keys are stable identifiers the caller
/// matches on; the rendered custom id is namespaced by the invocation.
#[derive(Clone, Copy, Debug)]
pub struct ChoiceButton {
    pub key: &'static str,
    pub label: &'static str,
    pub style: serenity::ButtonStyle,
}

/// Build a single action row of buttons, custom ids scoped to `ctx_id`.
pub fn choice_components(
    ctx_id: u64,
    buttons: &[ChoiceButton],
) -> Vec<serenity::CreateActionRow> {
    let rendered = buttons
        .iter()
        .map(|button| {
            serenity::CreateButton::new(format!("{}_{}", ctx_id, button.key))
                .label(button.label)
                .style(button.style)
        })
        .collect();

    vec![serenity::CreateActionRow::Buttons(rendered)]
}

/// Wait for the invoking author to press one of `buttons` on `message`.
///
/// Returns the pressed button's key and the component interaction, or
/// `None` on timeout. The caller must respond to the interaction.
pub async fn await_choice<U, E>(
    ctx: poise::Context<'_, U, E>,
    message: &serenity::Message,
    buttons: &[ChoiceButton],
    timeout: Duration,
) -> Option<(&'static str, serenity::ComponentInteraction)>
where
    U: Send + Sync,
    E: Send + Sync,
{
    let ctx_id = ctx.id();

    let interaction = message
        .await_component_interaction(ctx)
        .author_id(ctx.author().id)
        .timeout(timeout)
        .await?;

    let key = buttons
        .iter()
        .map(|button| button.key)
        .find(|key| interaction.data.custom_id == format!("{}_{}", ctx_id, key));

    if key.is_none() {
        debug!(
            custom_id = %interaction.data.custom_id,
            "component press did not match any offered choice"
        );
    }

    key.map(|key| (key, interaction))
}
