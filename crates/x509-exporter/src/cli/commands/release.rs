//! `x509-exporter release` - Version and image tag computation.

use anyhow::Result;
use chrono::Utc;
use x509_core::release;

use crate::cli::args::{ImageArgs, ReleaseArgs, ReleaseCommands};

pub fn execute(args: ReleaseArgs) -> Result<()> {
    match args.command {
        ReleaseCommands::NextVersion { latest, tag } => {
            let next = release::next_patch(latest.as_deref())?;
            if tag {
                println!("{}", release::release_tag(&next));
            } else {
                println!("{next}");
            }
        }
        ReleaseCommands::Tags(image) => {
            for reference in references(&image)? {
                println!("{reference}");
            }
        }
        ReleaseCommands::BuildInfo(image) => {
            let version = release::parse_version(&image.version)?;
            let tags = references(&image)?;
            println!("APP_VERSION={version}");
            println!("BUILD_DATE={}", release::build_date(Utc::now()));
            println!("BUILD_TAGS={}", tags.join(","));
            println!("PROJECT_NAME={}", image.project);
        }
    }
    Ok(())
}

fn references(image: &ImageArgs) -> Result<Vec<String>> {
    let version = release::parse_version(&image.version)?;
    Ok(release::image_references(
        &image.registries,
        &image.project,
        &version,
    )?)
}
