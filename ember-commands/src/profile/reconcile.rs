//! First-link reconciliation for a freshly linked FID.
//!
//! When a member links a FID that already has a game directory record,
//! they choose what happens to that historical data: merge it, continue
//! as a new account, or opt out of being asked again. Merge and
//! continue both pass through a backup question first. The decision
//! logic is a plain state machine (`step`), the data operations are
//! isolated in `run_effects`, and only the driver at the bottom talks
//! to Discord.

use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::warn;

use ember_core::{Context, Error};
use ember_database::backup::BackupService;
use ember_database::Database;
use ember_database::impls::global_users::ensure_global_user;
use ember_database::impls::profiles::set_link_prompt_skipped;
use ember_utils::choice::{ChoiceButton, await_choice, choice_components};

const RECONCILE_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Merge,
    New,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Merge / continue-as-new / never-show-again.
    Prompt,
    /// Back up before applying the carried disposition?
    BackupConfirm(Disposition),
    Terminal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    ChooseMerge,
    ChooseNew,
    ChooseNeverAgain,
    AcceptBackup,
    DeclineBackup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    MarkPromptSkipped,
    CreateBackup,
    MergeGlobalRecord,
    KeepNewRecord,
}

/// Whether a first link should offer the reconciliation prompt.
///
/// `directory_created` is the bridge's answer for this link call: a
/// freshly created record has no history to reconcile. The skip flag is
/// the member's sticky opt-out.
pub fn should_offer_reconciliation(directory_created: bool, prompt_skipped: bool) -> bool {
    !directory_created && !prompt_skipped
}

/// Advance the machine. Pure; out-of-order events are ignored.
pub fn step(state: State, event: Event) -> (State, Vec<Effect>) {
    match (state, event) {
        (State::Prompt, Event::ChooseMerge) => (State::BackupConfirm(Disposition::Merge), vec![]),
        (State::Prompt, Event::ChooseNew) => (State::BackupConfirm(Disposition::New), vec![]),
        (State::Prompt, Event::ChooseNeverAgain) => {
            (State::Terminal, vec![Effect::MarkPromptSkipped])
        }
        (State::BackupConfirm(disposition), Event::AcceptBackup) => (
            State::Terminal,
            vec![Effect::CreateBackup, disposition_effect(disposition)],
        ),
        (State::BackupConfirm(disposition), Event::DeclineBackup) => {
            (State::Terminal, vec![disposition_effect(disposition)])
        }
        (state, _) => (state, vec![]),
    }
}

fn disposition_effect(disposition: Disposition) -> Effect {
    match disposition {
        Disposition::Merge => Effect::MergeGlobalRecord,
        Disposition::New => Effect::KeepNewRecord,
    }
}

/// Execute `effects` in order and build the combined outcome message.
///
/// Backup failure or absence is reported inline and never blocks the
/// disposition. A profile-store failure propagates; the game directory
/// degrades to a warning phrase.
pub async fn run_effects(
    db: &Database,
    backup: Option<&BackupService>,
    owner_id: u64,
    fid: i64,
    effects: &[Effect],
) -> anyhow::Result<String> {
    let mut parts = Vec::new();

    for effect in effects {
        match effect {
            Effect::MarkPromptSkipped => {
                set_link_prompt_skipped(db, owner_id).await?;
                parts.push("Got it, you won't be asked about merging again.".to_owned());
            }
            Effect::CreateBackup => {
                let phrase = match backup {
                    Some(service) => {
                        if service.create_backup(owner_id).await {
                            "Backup created."
                        } else {
                            "Backup failed; continuing anyway."
                        }
                    }
                    None => "Backup unavailable; continuing anyway.",
                };
                parts.push(phrase.to_owned());
            }
            Effect::MergeGlobalRecord => match ensure_global_user(db, fid).await {
                Ok(_) => parts.push(
                    "Merged: your existing game data stays linked to this account.".to_owned(),
                ),
                Err(err) => {
                    warn!(?err, fid, "game directory unreachable during merge");
                    parts.push(
                        "The game directory is unreachable; the merge was not completed."
                            .to_owned(),
                    );
                }
            },
            Effect::KeepNewRecord => {
                parts.push("Continuing without merging your old data.".to_owned());
            }
        }
    }

    Ok(parts.join(" "))
}

const PROMPT_BUTTONS: &[ChoiceButton] = &[
    ChoiceButton {
        key: "merge",
        label: "Merge Data",
        style: serenity::ButtonStyle::Primary,
    },
    ChoiceButton {
        key: "new",
        label: "Continue as New",
        style: serenity::ButtonStyle::Secondary,
    },
    ChoiceButton {
        key: "skip",
        label: "Never show again",
        style: serenity::ButtonStyle::Danger,
    },
];

const BACKUP_BUTTONS: &[ChoiceButton] = &[
    ChoiceButton {
        key: "backup",
        label: "Yes, back up first",
        style: serenity::ButtonStyle::Primary,
    },
    ChoiceButton {
        key: "nobackup",
        label: "No, continue",
        style: serenity::ButtonStyle::Secondary,
    },
];

fn event_for(key: &str) -> Option<Event> {
    match key {
        "merge" => Some(Event::ChooseMerge),
        "new" => Some(Event::ChooseNew),
        "skip" => Some(Event::ChooseNeverAgain),
        "backup" => Some(Event::AcceptBackup),
        "nobackup" => Some(Event::DeclineBackup),
        _ => None,
    }
}

fn buttons_for(state: State) -> &'static [ChoiceButton] {
    match state {
        State::BackupConfirm(_) => BACKUP_BUTTONS,
        _ => PROMPT_BUTTONS,
    }
}

fn dismissal_text(state: State) -> &'static str {
    match state {
        State::BackupConfirm(_) => {
            "Timed out with no changes made. Link your FID again to revisit merging."
        }
        _ => "No changes made. You'll be asked again next time you link a FID.",
    }
}

/// Drive the machine over Discord buttons for the invoking member.
///
/// The caller has already saved the FID and confirmed the directory
/// record pre-exists; this sends the prompt as an ephemeral follow-up
/// and walks the member through to a terminal summary.
pub async fn run_reconciliation(ctx: Context<'_>, fid: i64) -> Result<(), Error> {
    let owner_id = ctx.author().id.get();
    let ctx_id = ctx.id();
    let timeout = Duration::from_secs(RECONCILE_TIMEOUT_SECS);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .ephemeral(true)
                .content(
                    "This FID already has game data on record. \
                     What should happen to it? (Dismiss to be asked again later.)",
                )
                .components(choice_components(ctx_id, PROMPT_BUTTONS)),
        )
        .await?;
    let message = reply.message().await?.into_owned();

    let mut state = State::Prompt;

    while state != State::Terminal {
        let Some((key, interaction)) =
            await_choice(ctx, &message, buttons_for(state), timeout).await
        else {
            message
                .channel_id
                .edit_message(
                    ctx.http(),
                    message.id,
                    serenity::EditMessage::new()
                        .content(dismissal_text(state))
                        .components(vec![]),
                )
                .await?;
            return Ok(());
        };

        let Some(event) = event_for(key) else {
            continue;
        };

        let (next, effects) = step(state, event);
        state = next;

        if state == State::Terminal {
            // Acknowledge within the interaction window; the backup
            // call behind run_effects can be slow.
            interaction
                .create_response(
                    ctx.http(),
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .content("Working on it...")
                            .components(vec![]),
                    ),
                )
                .await?;

            let summary =
                run_effects(&ctx.data().db, ctx.data().backup.as_ref(), owner_id, fid, &effects)
                    .await?;

            interaction
                .edit_response(
                    ctx.http(),
                    serenity::EditInteractionResponse::new().content(summary),
                )
                .await?;
        } else {
            interaction
                .create_response(
                    ctx.http(),
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .content("Back up your current profile data first?")
                            .components(choice_components(ctx_id, BACKUP_BUTTONS)),
                    ),
                )
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use ember_database::backup::BackupService;
    use ember_database::Database;

    use super::{Disposition, Effect, Event, State, run_effects, should_offer_reconciliation, step};

    #[test]
    fn prompt_requires_a_preexisting_record_and_no_opt_out() {
        assert!(should_offer_reconciliation(false, false));
        assert!(!should_offer_reconciliation(true, false));
        assert!(!should_offer_reconciliation(false, true));
        assert!(!should_offer_reconciliation(true, true));
    }

    #[test]
    fn merge_choice_carries_into_backup_confirm() {
        let (state, effects) = step(State::Prompt, Event::ChooseMerge);
        assert_eq!(state, State::BackupConfirm(Disposition::Merge));
        assert!(effects.is_empty());
    }

    #[test]
    fn continue_as_new_carries_into_backup_confirm() {
        let (state, effects) = step(State::Prompt, Event::ChooseNew);
        assert_eq!(state, State::BackupConfirm(Disposition::New));
        assert!(effects.is_empty());
    }

    #[test]
    fn never_again_skips_backup_entirely() {
        let (state, effects) = step(State::Prompt, Event::ChooseNeverAgain);
        assert_eq!(state, State::Terminal);
        assert_eq!(effects, vec![Effect::MarkPromptSkipped]);
    }

    #[test]
    fn backup_runs_before_the_disposition() {
        let (state, effects) = step(
            State::BackupConfirm(Disposition::Merge),
            Event::AcceptBackup,
        );
        assert_eq!(state, State::Terminal);
        assert_eq!(effects, vec![Effect::CreateBackup, Effect::MergeGlobalRecord]);

        let (state, effects) = step(State::BackupConfirm(Disposition::New), Event::DeclineBackup);
        assert_eq!(state, State::Terminal);
        assert_eq!(effects, vec![Effect::KeepNewRecord]);
    }

    #[test]
    fn out_of_order_events_are_ignored() {
        let (state, effects) = step(State::Prompt, Event::AcceptBackup);
        assert_eq!(state, State::Prompt);
        assert!(effects.is_empty());

        let (state, effects) = step(
            State::BackupConfirm(Disposition::Merge),
            Event::ChooseNeverAgain,
        );
        assert_eq!(state, State::BackupConfirm(Disposition::Merge));
        assert!(effects.is_empty());
    }

    async fn memory_database() -> Database {
        let profiles = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("profiles pool");
        ember_database::schema::init_profile_store(&profiles)
            .await
            .expect("profile schema");

        let users = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("users pool");
        sqlx::query("CREATE TABLE users (fid INTEGER PRIMARY KEY, nickname TEXT, furnace_lv INTEGER)")
            .execute(&users)
            .await
            .expect("users schema");

        let settings = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("settings pool");

        Database::new(profiles, users, settings)
    }

    #[tokio::test]
    async fn merge_with_backup_reports_both_outcomes() {
        let db = memory_database().await;

        let base = std::env::temp_dir().join(format!("ember-reconcile-{}", std::process::id()));
        tokio::fs::create_dir_all(&base).await.expect("base dir");
        let source = base.join("profile.sqlite");
        tokio::fs::write(&source, b"profile-bytes").await.expect("source");
        let backup = BackupService::new(&source, base.join("backups"));

        let (state, _) = step(State::Prompt, Event::ChooseMerge);
        let (state, effects) = step(state, Event::AcceptBackup);
        assert_eq!(state, State::Terminal);

        let summary = run_effects(&db, Some(&backup), 7, 4242, &effects)
            .await
            .expect("effects");

        assert!(summary.contains("Backup created"), "summary: {summary}");
        assert!(summary.contains("Merged"), "summary: {summary}");

        let directory_row: Option<i64> = sqlx::query_scalar("SELECT fid FROM users WHERE fid = 4242")
            .fetch_optional(db.users())
            .await
            .expect("directory lookup");
        assert_eq!(directory_row, Some(4242));

        let _ = tokio::fs::remove_dir_all(&base).await;
    }

    #[tokio::test]
    async fn absent_backup_capability_is_reported_not_fatal() {
        let db = memory_database().await;

        let (state, _) = step(State::Prompt, Event::ChooseNew);
        let (_, effects) = step(state, Event::AcceptBackup);

        let summary = run_effects(&db, None, 7, 4242, &effects)
            .await
            .expect("effects");

        assert!(summary.contains("Backup unavailable"), "summary: {summary}");
        assert!(summary.contains("without merging"), "summary: {summary}");
    }

    #[tokio::test]
    async fn never_again_effect_sets_the_sticky_flag() {
        let db = memory_database().await;

        let (_, effects) = step(State::Prompt, Event::ChooseNeverAgain);
        run_effects(&db, None, 7, 4242, &effects)
            .await
            .expect("effects");

        assert!(
            ember_database::impls::profiles::is_link_prompt_skipped(&db, 7)
                .await
                .expect("flag")
        );
    }
}
