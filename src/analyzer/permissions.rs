//! `requested-permissions`

use super::{ClassifierContext, Rule};
use crate::models::{Badge, CatalogEntry, ReleaseLabel, RowData, CAPABILITY_KEYS};
use crate::utils::helpers::is_host_permission;

const CONTENT_SCRIPT: &str = "contentScript";

/// One badge per permission requested by the current version. Host
/// patterns collapse into a single `permission.contentScript`; UI
/// capability keys of the manifest are listed as permissions too.
pub struct RequestedPermissionsRule;

impl Rule for RequestedPermissionsRule {
    fn row_data(&self, entry: &CatalogEntry, _ctx: &ClassifierContext) -> RowData {
        let Some(manifest) = entry
            .data(ReleaseLabel::Current)
            .and_then(|data| data.manifest.as_ref())
        else {
            return RowData::excluded();
        };

        let mut badges: Vec<Badge> = Vec::new();
        let permissions = manifest.permission_names();
        let mut content_script = false;
        for permission in permissions.iter().flatten() {
            if is_host_permission(permission) {
                if !content_script {
                    content_script = true;
                    badges.push(Badge::permission(CONTENT_SCRIPT));
                }
            } else {
                badges.push(Badge::permission(*permission));
            }
        }

        badges.extend(
            CAPABILITY_KEYS
                .iter()
                .filter(|key| manifest.has_key(key))
                .map(|key| Badge::permission(*key)),
        );

        RowData {
            include: permissions.is_some(),
            badges,
        }
    }
}
