use anyhow::Result;
use dspace_rest::Client;
use serde_json::json;
use std::path::Path;

fn main() -> Result<()> {
    // Example program that calls the library API.
    // Configure the account via env vars or a `.dspacerc` file.
    let client = Client::from_env()?;

    let community = client.create_community(&json!({
        "name": "Digital Curation",
        "shortDescription": "Created by the dspace-rest demo",
    }))?;
    let community_id = community["uuid"].as_str().unwrap_or_default().to_string();
    println!("created community {}", community_id);

    let item = client.with_session(|session| {
        let collection = session
            .create_community_collection(&community_id, &json!({ "name": "Reports" }))?;
        let collection_id = collection["uuid"].as_str().unwrap_or_default().to_string();

        let item = session.create_collection_item(
            &collection_id,
            &json!({ "metadata": [{ "key": "dc.title", "value": "Annual report", "language": "en" }] }),
        )?;
        let item_id = item["uuid"].as_str().unwrap_or_default().to_string();
        session.add_item_bitstream(&item_id, Path::new("report.pdf"))?;
        Ok(item)
    })?;

    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}
