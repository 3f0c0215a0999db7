use std::time::Duration;

use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    insta::assert_snapshot!(res, @r###"
    # Base URL of the Waymark API, including the version prefix.
    api-url = "http://localhost:5000/api/v1"

    # Time to wait in milliseconds before giving up on an API request.
    request-timeout = 10000

    # Where login credentials are kept between runs. [possible values: file, memory]
    storage = "file"

    # Path to the credentials file used by file storage.
    # storage-file = ""

    # Vehicle used to compute routes. [possible values: car, bike, foot]
    vehicle = "car"
    "###);
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "waymark",
        "whoami",
        "-c",
        "./config.example.toml",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::Storage), "file");
    assert!(Config::request_timeout()? > Duration::ZERO);
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["waymark", "whoami", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}
