use crate::patching::domain::{AppId, FileDescriptor, ResolvedFile};
use crate::shared::error::PatchError;
use reqwest::Url;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "file"];

/// Checks that a vendor URI can actually be fetched
pub fn validate_fetch_uri(uri: &str) -> Result<Url, PatchError> {
    let parsed = Url::parse(uri).map_err(|e| PatchError::InvalidReference {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(PatchError::InvalidReference {
            uri: uri.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(parsed)
}

/// Builds the locations an agent downloads a package file from
///
/// Mirrors configured for the view come first as
/// `http://{mirror}/packages/{app_id}/{file}`; the origin
/// `{package_base_url}/{app_id}/{file}` is always last.
pub struct UriResolver<'a> {
    package_base_url: &'a str,
    file_servers: &'a [String],
}

impl<'a> UriResolver<'a> {
    pub fn new(package_base_url: &'a str, file_servers: &'a [String]) -> Self {
        Self {
            package_base_url,
            file_servers,
        }
    }

    pub fn origin_uri(&self, app_id: &AppId, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.package_base_url.trim_end_matches('/'),
            app_id,
            urlencoding::encode(file_name)
        )
    }

    pub fn resolve(&self, app_id: &AppId, file: &FileDescriptor) -> ResolvedFile {
        let encoded = urlencoding::encode(&file.file_name);
        let origin = self.origin_uri(app_id, &file.file_name);

        let mut file_uris: Vec<String> = self
            .file_servers
            .iter()
            .map(|mirror| mirror.trim().trim_end_matches('/'))
            .filter(|mirror| !mirror.is_empty())
            .map(|mirror| format!("http://{}/packages/{}/{}", mirror, app_id, encoded))
            .collect();
        file_uris.push(origin.clone());

        ResolvedFile {
            file_name: file.file_name.clone(),
            file_uri: origin,
            file_uris,
            file_size: file.file_size,
            file_hash: file.expected_hash().map(str::to_string),
        }
    }
}
