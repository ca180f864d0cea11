//! Qtree operations on `/api/storage/qtrees`.

use reqwest::Method;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{single, OntapClient, Records};
use crate::error::ClientError;
use crate::models::qtree::{composite_id, Qtree, QtreeRecord};

const QTREES: &str = "/api/storage/qtrees";

#[derive(Debug, Deserialize)]
struct QtreeId {
    id: i64,
}

impl OntapClient {
    /// Create a qtree and read it back.
    ///
    /// The POST response does not carry the new qtree id, so the qtree is
    /// looked up by volume and name once the job completes.
    #[instrument(skip(self, qtree), fields(name = %qtree.name, volume = %qtree.volume_uuid))]
    pub async fn create_qtree(&self, qtree: &Qtree) -> Result<Qtree, ClientError> {
        let body = serde_json::to_value(QtreeRecord::for_create(qtree)?)?;
        self.execute(Method::POST, &format!("{}?return_records=true", QTREES), Some(body))
            .await?;

        let created = self.get_qtree_in_volume(&qtree.volume_uuid, &qtree.name).await?;
        info!(uuid = ?created.uuid, "qtree created");
        Ok(created)
    }

    /// Find the qtree called `name` in a volume and read it.
    #[instrument(skip(self))]
    pub async fn get_qtree_in_volume(
        &self,
        volume_uuid: &str,
        name: &str,
    ) -> Result<Qtree, ClientError> {
        let path = format!(
            "{}?volume.uuid={}&name={}",
            QTREES,
            urlencoding::encode(volume_uuid),
            urlencoding::encode(name)
        );
        let found: Records<QtreeId> = self.get_json(&path).await?;
        let record = single(
            found.records,
            "qtree",
            format!("volume.uuid={} name={}", volume_uuid, name),
        )?;

        self.get_qtree(&composite_id(volume_uuid, record.id)).await
    }

    /// Read a qtree by its `<volume uuid>/<id>` identity.
    #[instrument(skip(self))]
    pub async fn get_qtree(&self, uuid: &str) -> Result<Qtree, ClientError> {
        let record: QtreeRecord = self.get_json(&format!("{}/{}", QTREES, uuid)).await?;
        Ok(record.into_qtree(uuid))
    }

    /// Modify name, security style and permissions in place, then read back.
    #[instrument(skip(self, qtree), fields(uuid = ?qtree.uuid))]
    pub async fn update_qtree(&self, qtree: &Qtree) -> Result<Qtree, ClientError> {
        let uuid = qtree.require_uuid()?;
        let body = serde_json::to_value(QtreeRecord::for_patch(qtree))?;
        self.execute(Method::PATCH, &format!("{}/{}", QTREES, uuid), Some(body))
            .await?;
        self.get_qtree(uuid).await
    }

    /// Delete a qtree. A qtree that is already gone is reported as not found.
    #[instrument(skip(self))]
    pub async fn delete_qtree(&self, uuid: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, &format!("{}/{}", QTREES, uuid), None)
            .await?;
        info!("qtree deleted");
        Ok(())
    }
}
