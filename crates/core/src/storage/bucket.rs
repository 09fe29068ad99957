//! Upload bucket provisioning.
//!
//! OpenDAL works inside a bucket and cannot create one, so startup uses the
//! AWS SDK against the same endpoint to make sure the bucket exists.

use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tracing::info;
use upgate_shared::S3Config;

use super::error::StorageError;

/// Region that takes no location constraint on bucket creation.
const DEFAULT_REGION: &str = "us-east-1";

/// Makes sure the configured upload bucket exists, creating it if needed.
pub async fn ensure_bucket(config: &S3Config) -> Result<(), StorageError> {
    let client = client(config);
    let bucket = config.upload_bucket.as_str();

    info!(bucket, "checking that bucket exists");
    if bucket_exists(&client, bucket).await? {
        return Ok(());
    }

    info!(bucket, "creating bucket");
    create_bucket(&client, bucket, &config.region).await
}

fn client(config: &S3Config) -> Client {
    let credentials = Credentials::new(
        &config.access_key,
        &config.secret_key,
        None,
        None,
        "upgate",
    );

    let sdk_config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(config.endpoint_url())
        .force_path_style(true)
        .build();

    Client::from_conf(sdk_config)
}

async fn bucket_exists(client: &Client, bucket: &str) -> Result<bool, StorageError> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => Ok(true),
        Err(err) => {
            let not_found = err
                .as_service_error()
                .is_some_and(HeadBucketError::is_not_found)
                || err
                    .raw_response()
                    .is_some_and(|response| response.status().as_u16() == 404);

            if not_found {
                Ok(false)
            } else {
                Err(StorageError::bucket_check(
                    bucket,
                    DisplayErrorContext(&err).to_string(),
                ))
            }
        }
    }
}

async fn create_bucket(client: &Client, bucket: &str, region: &str) -> Result<(), StorageError> {
    let mut request = client.create_bucket().bucket(bucket);
    if let Some(constraint) = location_constraint(region) {
        request = request.create_bucket_configuration(
            CreateBucketConfiguration::builder()
                .location_constraint(constraint)
                .build(),
        );
    }

    match request.send().await {
        Ok(_) => Ok(()),
        // Another instance won the race.
        Err(err)
            if err
                .as_service_error()
                .is_some_and(CreateBucketError::is_bucket_already_owned_by_you) =>
        {
            Ok(())
        }
        Err(err) => Err(StorageError::bucket_create(
            bucket,
            DisplayErrorContext(&err).to_string(),
        )),
    }
}

/// Location constraint for bucket creation in `region`.
fn location_constraint(region: &str) -> Option<BucketLocationConstraint> {
    if region.is_empty() || region == DEFAULT_REGION {
        None
    } else {
        Some(BucketLocationConstraint::from(region))
    }
}
