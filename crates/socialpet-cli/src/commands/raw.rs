use serde_json::Value;
use socialpet_client::{Method, RequestOptions};

use crate::cli::RequestArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_value;

pub(crate) async fn handle_request(ctx: &AppContext, args: RequestArgs) -> CliResult<()> {
    let method = Method::parse(&args.method).ok_or_else(|| {
        CliError::validation(format!(
            "unsupported method '{}'; expected GET, POST, PUT, PATCH or DELETE",
            args.method
        ))
    })?;
    let options = build_options(&args)?;
    let value = ctx.client.request(method, &args.path, options).await?;
    render_value(&value, ctx.output)
}

pub(crate) fn build_options(args: &RequestArgs) -> CliResult<RequestOptions> {
    let mut options = RequestOptions::new();
    for pair in &args.query {
        let (key, value) = parse_query_pair(pair)?;
        options = options.query(key, value);
    }
    if let Some(raw) = &args.body {
        let body: Value = serde_json::from_str(raw)
            .map_err(|err| CliError::validation(format!("--body is not valid JSON: {err}")))?;
        options = options.body(body);
    }
    Ok(options)
}

pub(crate) fn parse_query_pair(pair: &str) -> CliResult<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(CliError::validation(format!(
            "query parameter '{pair}' must look like key=value"
        ))),
    }
}
