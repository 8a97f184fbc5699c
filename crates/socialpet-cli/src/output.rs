//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;
use socialpet_api_models::{
    AdoptionListing, AnimalType, Breed, DonationOrganization, LostPet, Pet, UserAccount,
};
use socialpet_client::UserProfile;

use crate::cli::OutputFormat;
use crate::client::{CliResult, format_failure};

fn render<T, F>(value: &T, format: OutputFormat, table: F) -> CliResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|err| format_failure(&err))?,
        OutputFormat::Table => table(value),
    };
    println!("{}", text.trim_end());
    Ok(())
}

pub(crate) fn render_profile(profile: &UserProfile, format: OutputFormat) -> CliResult<()> {
    render(profile, format, format_profile)
}

pub(crate) fn render_account(account: &UserAccount, format: OutputFormat) -> CliResult<()> {
    render(account, format, format_account)
}

pub(crate) fn render_adoption_list(
    listings: &[AdoptionListing],
    format: OutputFormat,
) -> CliResult<()> {
    render(listings, format, format_adoption_table)
}

pub(crate) fn render_adoption_detail(
    listing: &AdoptionListing,
    format: OutputFormat,
) -> CliResult<()> {
    render(listing, format, format_adoption_detail)
}

pub(crate) fn render_lost_list(reports: &[LostPet], format: OutputFormat) -> CliResult<()> {
    render(reports, format, format_lost_table)
}

pub(crate) fn render_lost_detail(report: &LostPet, format: OutputFormat) -> CliResult<()> {
    render(report, format, format_lost_detail)
}

pub(crate) fn render_donation_list(
    organizations: &[DonationOrganization],
    format: OutputFormat,
) -> CliResult<()> {
    render(organizations, format, format_donation_table)
}

pub(crate) fn render_donation_detail(
    organization: &DonationOrganization,
    format: OutputFormat,
) -> CliResult<()> {
    render(organization, format, format_donation_detail)
}

pub(crate) fn render_pet_list(pets: &[Pet], format: OutputFormat) -> CliResult<()> {
    render(pets, format, format_pet_table)
}

pub(crate) fn render_pet_detail(pet: &Pet, format: OutputFormat) -> CliResult<()> {
    render(pet, format, format_pet_detail)
}

pub(crate) fn render_breeds(breeds: &[Breed], format: OutputFormat) -> CliResult<()> {
    render(breeds, format, format_breed_table)
}

pub(crate) fn render_animal_types(types: &[AnimalType], format: OutputFormat) -> CliResult<()> {
    render(types, format, |types: &[AnimalType]| {
        types.iter().fold(String::new(), |mut out, kind| {
            let _ = writeln!(out, "{}", kind.name);
            out
        })
    })
}

pub(crate) fn render_account_list(accounts: &[UserAccount], format: OutputFormat) -> CliResult<()> {
    render(accounts, format, format_account_table)
}

/// Raw responses have no table layout; both formats print indented JSON.
pub(crate) fn render_value(value: &Value, format: OutputFormat) -> CliResult<()> {
    if value.is_null() && format == OutputFormat::Table {
        println!("(empty response)");
        return Ok(());
    }
    render(value, OutputFormat::Json, |_| String::new())
}

pub(crate) fn format_profile(profile: &UserProfile) -> String {
    format!(
        "id: {}\nname: {}\nemail: {}\nrole: {}\n",
        profile.id, profile.display_name, profile.email, profile.role
    )
}

pub(crate) fn format_account(account: &UserAccount) -> String {
    let mut out = format!(
        "id: {}\nusername: {}\nemail: {}\n",
        account.id, account.username, account.email
    );
    let name = [account.first_name.as_deref(), account.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !name.is_empty() {
        let _ = writeln!(out, "name: {name}");
    }
    optional_line(&mut out, "role", account.role.as_deref());
    optional_line(&mut out, "status", account.status.as_deref());
    optional_line(&mut out, "joined", account.created_at.as_deref());
    out
}

pub(crate) fn format_adoption_table(listings: &[AdoptionListing]) -> String {
    let mut out = format!("{:<12} {:<20} {:<12} {:<16} TITLE\n", "ID", "PET", "AGE", "CITY");
    for listing in listings {
        let _ = writeln!(
            out,
            "{:<12} {:<20} {:<12} {:<16} {}",
            listing.id,
            placeholder(&listing.pet_name),
            format_age(&listing.age),
            placeholder(&listing.city),
            listing.title
        );
    }
    if listings.is_empty() {
        out.push_str("no listings\n");
    }
    out
}

pub(crate) fn format_adoption_detail(listing: &AdoptionListing) -> String {
    let mut out = format!("id: {}\ntitle: {}\n", listing.id, listing.title);
    optional_line(&mut out, "slug", listing.slug.as_deref());
    optional_line(&mut out, "pet", non_empty(&listing.pet_name));
    optional_line(&mut out, "type", listing.animal_type.as_deref());
    optional_line(&mut out, "breed", non_empty(&listing.breed));
    let age = format_age(&listing.age);
    optional_line(&mut out, "age", non_empty(&age));
    optional_line(&mut out, "gender", non_empty(&listing.gender));
    optional_line(&mut out, "size", non_empty(&listing.size));
    let location = [listing.district.trim(), listing.city.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    optional_line(&mut out, "location", non_empty(&location));
    optional_line(&mut out, "contact", non_empty(&listing.full_name));
    optional_line(&mut out, "phone", non_empty(&listing.phone));
    optional_line(&mut out, "status", non_empty(&listing.status));
    optional_line(&mut out, "image", listing.image_url.as_deref());
    if let Some(views) = listing.view_count {
        let _ = writeln!(out, "views: {views}");
    }
    if !listing.description.trim().is_empty() {
        let _ = writeln!(out, "\n{}", listing.description.trim());
    }
    out
}

pub(crate) fn format_lost_table(reports: &[LostPet]) -> String {
    let mut out = format!("{:<26} {:<8} {:<10} {:<20} TITLE\n", "ID", "STATUS", "TYPE", "LOCATION");
    for report in reports {
        let _ = writeln!(
            out,
            "{:<26} {:<8} {:<10} {:<20} {}",
            report.id.as_deref().unwrap_or("-"),
            placeholder(&report.status),
            placeholder(&report.animal_type),
            placeholder(&report.location),
            report.title
        );
    }
    if reports.is_empty() {
        out.push_str("no reports\n");
    }
    out
}

pub(crate) fn format_lost_detail(report: &LostPet) -> String {
    let mut out = String::new();
    optional_line(&mut out, "id", report.id.as_deref());
    let _ = writeln!(out, "title: {}", report.title);
    optional_line(&mut out, "status", non_empty(&report.status));
    optional_line(&mut out, "type", non_empty(&report.animal_type));
    optional_line(&mut out, "location", non_empty(&report.location));
    optional_line(&mut out, "last seen", report.last_seen_location.as_deref());
    optional_line(&mut out, "last seen on", report.last_seen_date.as_deref());
    optional_line(&mut out, "contact", report.contact_info.as_deref());
    optional_line(&mut out, "owner", report.user_id.as_deref());
    optional_line(&mut out, "image", report.image_url.as_deref());
    if !report.details.trim().is_empty() {
        let _ = writeln!(out, "\n{}", report.details.trim());
    }
    out
}

pub(crate) fn format_donation_table(organizations: &[DonationOrganization]) -> String {
    let mut out = format!("{:<6} {:<32} WEBSITE\n", "ID", "NAME");
    for organization in organizations {
        let _ = writeln!(
            out,
            "{:<6} {:<32} {}",
            organization.id,
            organization.name,
            organization.website.as_deref().unwrap_or("-")
        );
    }
    if organizations.is_empty() {
        out.push_str("no organizations\n");
    }
    out
}

pub(crate) fn format_donation_detail(organization: &DonationOrganization) -> String {
    let mut out = format!("id: {}\nname: {}\n", organization.id, organization.name);
    optional_line(&mut out, "iban", non_empty(&organization.iban));
    optional_line(&mut out, "phone", non_empty(&organization.phone_number));
    optional_line(&mut out, "address", non_empty(&organization.address));
    optional_line(&mut out, "website", organization.website.as_deref());
    optional_line(&mut out, "instagram", organization.instagram_url.as_deref());
    optional_line(&mut out, "facebook", organization.facebook_url.as_deref());
    optional_line(&mut out, "twitter", organization.twitter_url.as_deref());
    optional_line(&mut out, "logo", organization.image_url.as_deref());
    if !organization.description.trim().is_empty() {
        let _ = writeln!(out, "\n{}", organization.description.trim());
    }
    out
}

pub(crate) fn format_pet_table(pets: &[Pet]) -> String {
    let mut out = format!("{:<12} {:<20} {:<8} {:<8} BREED\n", "ID", "NAME", "TYPE", "AGE");
    for pet in pets {
        let id = pet.id.as_ref().map_or_else(|| "-".to_string(), ToString::to_string);
        let _ = writeln!(
            out,
            "{:<12} {:<20} {:<8} {:<8} {}",
            id,
            placeholder(&pet.name),
            placeholder(&pet.animal_type),
            pet.age,
            pet.breed_id
        );
    }
    if pets.is_empty() {
        out.push_str("no pets\n");
    }
    out
}

pub(crate) fn format_pet_detail(pet: &Pet) -> String {
    let mut out = String::new();
    if let Some(id) = &pet.id {
        let _ = writeln!(out, "id: {id}");
    }
    let _ = writeln!(out, "name: {}", pet.name);
    optional_line(&mut out, "type", non_empty(&pet.animal_type));
    let _ = writeln!(out, "age: {}", pet.age);
    optional_line(&mut out, "gender", non_empty(&pet.gender));
    let _ = writeln!(out, "breed: {}", pet.breed_id);
    if let Some(owner) = pet.owner_id {
        let _ = writeln!(out, "owner: {owner}");
    }
    optional_line(&mut out, "image", pet.image_url.as_deref());
    out
}

pub(crate) fn format_breed_table(breeds: &[Breed]) -> String {
    let mut out = format!("{:<6} {:<10} NAME\n", "ID", "TYPE");
    for breed in breeds {
        let _ = writeln!(
            out,
            "{:<6} {:<10} {}",
            breed.id,
            placeholder(&breed.animal_type),
            breed.name
        );
    }
    if breeds.is_empty() {
        out.push_str("no breeds\n");
    }
    out
}

pub(crate) fn format_account_table(accounts: &[UserAccount]) -> String {
    let mut out = format!("{:<26} {:<20} {:<8} EMAIL\n", "ID", "USERNAME", "ROLE");
    for account in accounts {
        let _ = writeln!(
            out,
            "{:<26} {:<20} {:<8} {}",
            account.id,
            placeholder(&account.username),
            account.role.as_deref().unwrap_or("-"),
            placeholder(&account.email)
        );
    }
    if accounts.is_empty() {
        out.push_str("no accounts\n");
    }
    out
}

/// Ages arrive as numbers or free text.
pub(crate) fn format_age(age: &Value) -> String {
    match age {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}

fn optional_line(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
        let _ = writeln!(out, "{label}: {value}");
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn placeholder(value: &str) -> &str {
    non_empty(value).unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    fn listing() -> Result<AdoptionListing> {
        Ok(serde_json::from_value(json!({
            "id": 7,
            "title": "Playful kitten",
            "petName": "Pamuk",
            "age": "6 months",
            "city": "Izmir",
            "district": "Bornova",
            "description": "Loves string.  ",
            "slug": "playful-kitten-7"
        }))?)
    }

    #[test]
    fn adoption_table_uses_placeholders_for_missing_columns() -> Result<()> {
        let mut bare = listing()?;
        bare.city = String::new();
        bare.age = json!(3);
        let text = format_adoption_table(&[listing()?, bare]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("6 months"));
        assert!(lines[1].contains("Izmir"));
        assert!(lines[2].contains(" - "));
        assert!(lines[2].contains(" 3 "));
        Ok(())
    }

    #[test]
    fn adoption_detail_skips_blank_fields() -> Result<()> {
        let text = format_adoption_detail(&listing()?);
        assert!(text.contains("slug: playful-kitten-7"));
        assert!(text.contains("location: Bornova, Izmir"));
        assert!(!text.contains("breed:"));
        assert!(text.trim_end().ends_with("Loves string."));
        Ok(())
    }

    #[test]
    fn empty_lists_say_so() {
        assert!(format_lost_table(&[]).contains("no reports"));
        assert!(format_donation_table(&[]).contains("no organizations"));
    }

    #[test]
    fn lost_report_without_id_renders_dash() {
        let report = LostPet {
            title: "Grey tabby".into(),
            status: "LOST".into(),
            ..LostPet::default()
        };
        let text = format_lost_table(&[report]);
        assert!(text.lines().nth(1).is_some_and(|line| line.starts_with("- ")));
    }

    #[test]
    fn account_joins_available_name_parts() {
        let account = UserAccount {
            id: "u-1".into(),
            username: "deniz".into(),
            email: "deniz@example.com".into(),
            first_name: Some("Deniz".into()),
            last_name: None,
            role: Some("USER".into()),
            ..UserAccount::default()
        };
        let text = format_account(&account);
        assert!(text.contains("name: Deniz\n"));
        assert!(text.contains("role: USER"));
        assert!(!text.contains("status:"));
    }

    #[test]
    fn pet_rows_show_dash_for_unsaved_pets() {
        let pet = Pet {
            name: "Pamuk".into(),
            animal_type: "CAT".into(),
            age: 1,
            breed_id: 3,
            ..Pet::default()
        };
        let text = format_pet_table(&[pet.clone()]);
        assert!(text.lines().nth(1).is_some_and(|line| line.starts_with("- ")));
        let detail = format_pet_detail(&pet);
        assert!(detail.starts_with("name: Pamuk\n"));
        assert!(!detail.contains("owner:"));
        assert!(format_breed_table(&[]).contains("no breeds"));
    }

    #[test]
    fn account_table_marks_missing_role() {
        let account = UserAccount {
            id: "u-7".into(),
            username: "deniz".into(),
            ..UserAccount::default()
        };
        let text = format_account_table(&[account]);
        let row = text.lines().nth(1).unwrap_or_default();
        assert!(row.starts_with("u-7"));
        assert!(row.contains(" - "));
    }

    #[test]
    fn ages_render_without_quotes() {
        assert_eq!(format_age(&json!("2 years")), "2 years");
        assert_eq!(format_age(&json!(4)), "4");
        assert_eq!(format_age(&Value::Null), "");
    }
}
