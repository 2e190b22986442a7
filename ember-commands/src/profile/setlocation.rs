use crate::CommandMeta;
use ember_core::{Context, Error};
use ember_database::impls::profiles::upsert_profile;
use ember_database::model::profile::ProfilePatch;

pub const META: CommandMeta = CommandMeta {
    name: "setlocation",
    desc: "Set your base coordinates.",
    category: "profile",
    usage: "/setlocation <x> <y>",
};

#[poise::command(slash_command, category = "Profile")]
pub async fn setlocation(
    ctx: Context<'_>,
    #[description = "Base X coordinate"] x: i64,
    #[description = "Base Y coordinate"] y: i64,
) -> Result<(), Error> {
    upsert_profile(
        &ctx.data().db,
        ctx.author().id.get(),
        ProfilePatch {
            location_x: Some(x),
            location_y: Some(y),
            ..ProfilePatch::default()
        },
    )
    .await?;

    ctx.send(
        poise::CreateReply::default()
            .ephemeral(true)
            .content(format!("Location updated to X: {} Y: {}.", x, y)),
    )
    .await?;

    Ok(())
}
