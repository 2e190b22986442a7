use crate::CommandMeta;
use ember_core::{Context, Error};
use ember_database::impls::profiles::upsert_profile;
use ember_database::model::profile::ProfilePatch;

pub const META: CommandMeta = CommandMeta {
    name: "settrap",
    desc: "Set your Bear Trap schedule note.",
    category: "profile",
    usage: "/settrap <schedule>",
};

const TRAP_NOTE_MAX_CHARS: usize = 500;

#[poise::command(slash_command, category = "Profile")]
pub async fn settrap(
    ctx: Context<'_>,
    #[description = "When your Bear Trap runs"] schedule: String,
) -> Result<(), Error> {
    let schedule = schedule.trim().to_owned();

    if schedule.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .ephemeral(true)
                .content("The schedule note cannot be empty."),
        )
        .await?;
        return Ok(());
    }

    if schedule.chars().count() > TRAP_NOTE_MAX_CHARS {
        ctx.send(poise::CreateReply::default().ephemeral(true).content(format!(
            "The schedule note is too long (max {} characters).",
            TRAP_NOTE_MAX_CHARS
        )))
        .await?;
        return Ok(());
    }

    upsert_profile(
        &ctx.data().db,
        ctx.author().id.get(),
        ProfilePatch {
            trap_note: Some(schedule),
            ..ProfilePatch::default()
        },
    )
    .await?;

    ctx.send(
        poise::CreateReply::default()
            .ephemeral(true)
            .content("Bear Trap schedule saved."),
    )
    .await?;

    Ok(())
}
