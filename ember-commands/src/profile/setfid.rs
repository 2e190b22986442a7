use tracing::warn;

use crate::CommandMeta;
use crate::profile::reconcile::{run_reconciliation, should_offer_reconciliation};
use ember_core::{Context, Error};
use ember_database::impls::global_users::ensure_global_user;
use ember_database::impls::profiles::{is_link_prompt_skipped, upsert_profile};
use ember_database::model::profile::ProfilePatch;

pub const META: CommandMeta = CommandMeta {
    name: "setfid",
    desc: "Link your in-game FID to your Discord account.",
    category: "profile",
    usage: "/setfid <fid>",
};

#[poise::command(slash_command, category = "Profile")]
pub async fn setfid(
    ctx: Context<'_>,
    #[description = "Your in-game FID"] fid: i64,
) -> Result<(), Error> {
    if fid <= 0 {
        ctx.send(
            poise::CreateReply::default()
                .ephemeral(true)
                .content("FID must be a positive number."),
        )
        .await?;
        return Ok(());
    }

    ctx.defer_ephemeral().await?;

    let owner_id = ctx.author().id.get();
    upsert_profile(
        &ctx.data().db,
        owner_id,
        ProfilePatch {
            fid: Some(fid),
            ..ProfilePatch::default()
        },
    )
    .await?;

    let created = match ensure_global_user(&ctx.data().db, fid).await {
        Ok(created) => {
            let status = if created {
                "FID saved. A fresh game directory record was created for it."
            } else {
                "FID saved. This FID already has a game directory record."
            };
            ctx.say(status).await?;
            created
        }
        Err(err) => {
            warn!(?err, fid, "game directory unreachable while linking");
            ctx.say("FID saved. The game directory is currently unreachable, so it was not checked.")
                .await?;
            return Ok(());
        }
    };

    let prompt_skipped = is_link_prompt_skipped(&ctx.data().db, owner_id).await?;
    if !should_offer_reconciliation(created, prompt_skipped) {
        return Ok(());
    }

    run_reconciliation(ctx, fid).await
}
