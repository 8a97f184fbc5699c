use socialpet_client::{PetService, UserService};

use crate::cli::{BreedArgs, PetIdArgs, PetListArgs, UserIdArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{
    render_account, render_account_list, render_animal_types, render_breeds, render_pet_detail,
    render_pet_list,
};

pub(crate) async fn handle_pet_list(ctx: &AppContext, args: PetListArgs) -> CliResult<()> {
    let service = PetService::new(ctx.client.clone());
    let pets = match args.owner {
        Some(owner) => service.by_owner(owner).await?,
        None => service.list().await?,
    };
    render_pet_list(&pets, ctx.output)
}

pub(crate) async fn handle_pet_show(ctx: &AppContext, args: PetIdArgs) -> CliResult<()> {
    let pet = PetService::new(ctx.client.clone()).get(&args.id).await?;
    render_pet_detail(&pet, ctx.output)
}

pub(crate) async fn handle_breeds(ctx: &AppContext, args: BreedArgs) -> CliResult<()> {
    let service = PetService::new(ctx.client.clone());
    if args.types {
        let types = service.animal_types().await?;
        return render_animal_types(&types, ctx.output);
    }
    let breeds = match args.animal_type.as_deref() {
        Some(animal_type) => service.breeds_by_animal_type(animal_type).await?,
        None => service.breeds().await?,
    };
    render_breeds(&breeds, ctx.output)
}

pub(crate) async fn handle_user_list(ctx: &AppContext) -> CliResult<()> {
    let accounts = UserService::new(ctx.client.clone()).list_all().await?;
    render_account_list(&accounts, ctx.output)
}

pub(crate) async fn handle_user_show(ctx: &AppContext, args: UserIdArgs) -> CliResult<()> {
    let account = UserService::new(ctx.client.clone()).get(&args.id).await?;
    render_account(&account, ctx.output)
}
