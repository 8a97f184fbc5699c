use socialpet_client::{AdoptionService, DonationService, LostPetService};

use crate::cli::{IdArgs, NumericIdArgs, SlugArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{
    render_adoption_detail, render_adoption_list, render_donation_detail, render_donation_list,
    render_lost_detail, render_lost_list,
};

pub(crate) async fn handle_adoption_list(ctx: &AppContext) -> CliResult<()> {
    let listings = AdoptionService::new(ctx.client.clone()).recent().await?;
    render_adoption_list(&listings, ctx.output)
}

pub(crate) async fn handle_adoption_show(ctx: &AppContext, args: SlugArgs) -> CliResult<()> {
    let listing = AdoptionService::new(ctx.client.clone())
        .by_slug(args.slug.trim())
        .await?;
    render_adoption_detail(&listing, ctx.output)
}

pub(crate) async fn handle_lost_list(ctx: &AppContext) -> CliResult<()> {
    let reports = LostPetService::new(ctx.client.clone()).list().await?;
    render_lost_list(&reports, ctx.output)
}

pub(crate) async fn handle_lost_show(ctx: &AppContext, args: IdArgs) -> CliResult<()> {
    let report = LostPetService::new(ctx.client.clone())
        .get(args.id.trim())
        .await?;
    render_lost_detail(&report, ctx.output)
}

pub(crate) async fn handle_donation_list(ctx: &AppContext) -> CliResult<()> {
    let organizations = DonationService::new(ctx.client.clone()).active().await?;
    render_donation_list(&organizations, ctx.output)
}

pub(crate) async fn handle_donation_show(ctx: &AppContext, args: NumericIdArgs) -> CliResult<()> {
    let organization = DonationService::new(ctx.client.clone()).get(args.id).await?;
    render_donation_detail(&organization, ctx.output)
}
