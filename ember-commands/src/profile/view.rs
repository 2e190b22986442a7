use poise::serenity_prelude as serenity;
use tracing::warn;

use crate::CommandMeta;
use ember_core::{Context, Error};
use ember_database::impls::admins::is_admin;
use ember_database::impls::global_users::get_furnace_level;
use ember_database::impls::profiles::get_profile;
use ember_database::model::profile::Profile;
use ember_utils::embed::build_titled_embed;
use ember_utils::furnace::furnace_text;

pub const META: CommandMeta = CommandMeta {
    name: "profile",
    desc: "View a member's profile card.",
    category: "profile",
    usage: "/profile [member]",
};

#[poise::command(slash_command, category = "Profile")]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "Member to view (admins only for other members)"] member: Option<
        serenity::User,
    >,
) -> Result<(), Error> {
    let target = member.unwrap_or_else(|| ctx.author().clone());

    if target.id != ctx.author().id && !is_admin(&ctx.data().db, ctx.author().id.get()).await {
        ctx.send(
            poise::CreateReply::default()
                .ephemeral(true)
                .content("You can only view your own profile."),
        )
        .await?;
        return Ok(());
    }

    let profile = get_profile(&ctx.data().db, target.id.get()).await?;

    let furnace = match profile.as_ref().and_then(|profile| profile.fid) {
        Some(fid) => match get_furnace_level(&ctx.data().db, fid).await {
            Ok(level) => furnace_text(level),
            Err(err) => {
                warn!(?err, fid, "game directory unreachable while rendering profile");
                furnace_text(None)
            }
        },
        None => furnace_text(None),
    };

    let display_name = target
        .global_name
        .clone()
        .unwrap_or_else(|| target.name.clone());

    let mut embed = build_titled_embed(format!("Profile of {}", display_name));
    for (name, value, inline) in profile_fields(profile.as_ref(), &furnace) {
        embed = embed.field(name, value, inline);
    }
    if let Some(url) = profile.as_ref().and_then(|profile| profile.avatar_url.as_deref()) {
        embed = embed.thumbnail(url.to_owned());
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Assemble the card fields. Location only appears once both
/// coordinates are set; optional fields are omitted rather than shown
/// empty.
fn profile_fields(profile: Option<&Profile>, furnace: &str) -> Vec<(&'static str, String, bool)> {
    let mut fields = Vec::new();

    if let Some(fid) = profile.and_then(|profile| profile.fid) {
        fields.push(("FID", fid.to_string(), true));
    }

    fields.push(("Furnace Level", furnace.to_owned(), true));

    if let Some(profile) = profile
        && let (Some(x), Some(y)) = (profile.location_x, profile.location_y)
    {
        fields.push(("Location", format!("X: {} Y: {}", x, y), false));
    }

    if let Some(note) = profile.and_then(|profile| profile.trap_note.as_deref()) {
        fields.push(("Bear Trap", note.replace('@', "@\u{200B}"), false));
    }

    fields
}
