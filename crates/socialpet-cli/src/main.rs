//! Binary entrypoint for the SocialPet CLI.

#[tokio::main]
async fn main() {
    let exit_code = socialpet_cli::run().await;
    std::process::exit(exit_code);
}
