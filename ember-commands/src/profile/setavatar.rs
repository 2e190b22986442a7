use crate::CommandMeta;
use ember_core::{Context, Error};
use ember_database::impls::profiles::upsert_profile;
use ember_database::model::profile::ProfilePatch;

pub const META: CommandMeta = CommandMeta {
    name: "setavatar",
    desc: "Set the image shown on your profile card.",
    category: "profile",
    usage: "/setavatar <url>",
};

const AVATAR_URL_MAX_CHARS: usize = 512;

#[poise::command(slash_command, category = "Profile")]
pub async fn setavatar(
    ctx: Context<'_>,
    #[description = "Image URL"] url: String,
) -> Result<(), Error> {
    let url = url.trim().to_owned();

    if !(url.starts_with("http://") || url.starts_with("https://"))
        || url.chars().count() > AVATAR_URL_MAX_CHARS
    {
        ctx.send(
            poise::CreateReply::default()
                .ephemeral(true)
                .content("Provide a valid http(s) image URL."),
        )
        .await?;
        return Ok(());
    }

    upsert_profile(
        &ctx.data().db,
        ctx.author().id.get(),
        ProfilePatch {
            avatar_url: Some(url),
            ..ProfilePatch::default()
        },
    )
    .await?;

    ctx.send(
        poise::CreateReply::default()
            .ephemeral(true)
            .content("Profile image saved."),
    )
    .await?;

    Ok(())
}
