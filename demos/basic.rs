//! Basic usage example: list organizations and create a project.

use capstan_api::{Client, Related, Request, Resource, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Organization {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
}

impl Resource for Organization {
    const KIND: &'static str = "organizations";
}

#[derive(Debug, Serialize, Deserialize)]
struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<Related<Organization>>,
}

impl Resource for Project {
    const KIND: &'static str = "projects";
    const RELATIONSHIPS: &'static [&'static str] = &["organization"];
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("capstan_api=debug")
        .init();

    // An unset CAPSTAN_TOKEN fails construction with a config error, and the
    // address defaults to the hosted platform when CAPSTAN_ADDRESS is unset
    let mut builder =
        Client::builder().token(std::env::var("CAPSTAN_TOKEN").unwrap_or_default());
    if let Ok(address) = std::env::var("CAPSTAN_ADDRESS") {
        builder = builder.address(address);
    }
    let client = builder.build()?;

    // List organizations the token can see
    let orgs: Vec<Organization> = client
        .execute_list(Request::get("/api/v2/organizations").query("page[size]", "20"))
        .await?;

    for org in &orgs {
        println!("organization: {}", org.name);
    }

    // Create a project under the first one
    if let Some(org) = orgs.first().and_then(|o| o.id.as_deref()) {
        let new_project = Project {
            id: None,
            name: "demo-project".to_string(),
            organization: Some(Related::new(org)),
        };
        let created: Project = client
            .execute(Request::post("/api/v2/projects").payload(&new_project))
            .await?;
        println!("created project: {:?}", created.id);
    }

    Ok(())
}
