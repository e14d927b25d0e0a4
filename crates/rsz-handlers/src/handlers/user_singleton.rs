use rsz_types::{BaseFile, Environment, Instance};
use tracing::debug;

use crate::config::HandlerConfig;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::{ResourceHandler, ResourceMap};
use crate::resource::{ContentResource, ResourceBody};

/// A user file whose root instance of one class is the single resource.
#[derive(Debug)]
pub struct UserSingletonHandler {
    class: String,
    id: i64,
}

impl UserSingletonHandler {
    pub const DISCRIMINATOR: &'static str = "user-singleton";

    pub fn from_config(config: &HandlerConfig, env: &Environment) -> HandlerResult<Self> {
        let class = config.require_str("class")?;
        env.class(class)?;
        Ok(Self {
            class: class.to_string(),
            id: config.int_or("id", 0)?,
        })
    }

    fn missing_root(&self) -> HandlerError {
        HandlerError::MissingRoot {
            handler: Self::DISCRIMINATOR.into(),
            message: format!("no root instance of {}", self.class),
        }
    }

    fn wrong_format(actual: &str) -> HandlerError {
        HandlerError::WrongFormat {
            handler: Self::DISCRIMINATOR.into(),
            expected: "rsz".into(),
            actual: actual.into(),
        }
    }
}

impl ResourceHandler for UserSingletonHandler {
    fn discriminator(&self) -> &'static str {
        Self::DISCRIMINATOR
    }

    fn read_resources(&self, file: &str, base: &BaseFile, _env: &Environment) -> HandlerResult<ResourceMap> {
        let rsz = base
            .as_rsz()
            .ok_or_else(|| Self::wrong_format(base.format_name()))?;
        let root = rsz
            .instances
            .iter()
            .find(|inst| inst.class == self.class)
            .ok_or_else(|| self.missing_root())?;

        debug!(file, class = %self.class, "singleton resource read");
        let resource = ContentResource::new(self.id, file, ResourceBody::Object(root.clone()));
        Ok(ResourceMap::from([(self.id, resource)]))
    }

    fn modify_resources(
        &self,
        base: &mut BaseFile,
        resources: &ResourceMap,
        _env: &Environment,
    ) -> HandlerResult<()> {
        let Some(resource) = resources.get(&self.id) else {
            return Ok(());
        };
        let ResourceBody::Object(edited) = &resource.body else {
            return Err(HandlerError::ResourceShape {
                handler: Self::DISCRIMINATOR.into(),
                id: resource.id,
                expected: "object".into(),
                actual: resource.body.shape().into(),
            });
        };

        let format = base.format_name();
        let rsz = base.as_rsz_mut().ok_or_else(|| Self::wrong_format(format))?;
        let root: &mut Instance = rsz
            .instances
            .iter_mut()
            .find(|inst| inst.class == self.class)
            .ok_or_else(|| self.missing_root())?;
        *root = edited.clone();
        Ok(())
    }
}
