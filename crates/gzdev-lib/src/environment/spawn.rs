use crate::config::GazeboCompatibility;
use crate::error::GzdevError;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, Default)]
pub struct SpawnRequest {
    pub gazebo_version: Option<String>,
    pub ros_distro: Option<String>,
    pub world_config: Option<String>,
    pub pull_request: Option<String>,
    /// Accept a Gazebo + ROS pairing that is compatible but not the official one
    pub confirm: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnPlan {
    pub gazebo_version: u32,
    pub ros_distro: Option<String>,
    pub world_config: Option<String>,
    pub pull_request: Option<String>,
}

impl Display for SpawnPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Spawning docker container for Gazebo {}", self.gazebo_version)?;
        if let Some(ros) = &self.ros_distro {
            write!(f, " + ROS {ros}")?;
        }
        if let Some(world_config) = &self.world_config {
            write!(f, " running world configuration {world_config}")?;
        }
        if let Some(pr) = &self.pull_request {
            write!(f, " from PR# {pr}")?;
        }
        write!(f, ".")
    }
}

fn invalid(details: String) -> GzdevError {
    GzdevError::CliArgumentValidation { details }
}

pub fn plan_spawn(
    compatibility: &GazeboCompatibility,
    request: &SpawnRequest,
) -> Result<SpawnPlan, GzdevError> {
    let ros = request.ros_distro.as_deref().map(str::to_lowercase);
    let official = ros
        .as_ref()
        .and_then(|ros| compatibility.official_ros.get(ros).copied());

    let gazebo_version = match request.gazebo_version.as_deref() {
        Some(raw) => {
            let version = raw
                .parse::<u32>()
                .ok()
                .filter(|v| (1..=compatibility.max_version).contains(v))
                .ok_or_else(|| invalid(format!("'{raw}' is not a valid Gazebo version number.")))?;
            Some(version)
        }
        None => official,
    };

    let supported_ros = match gazebo_version {
        Some(version) => Some(
            compatibility
                .compatible
                .iter()
                .find(|release| release.version == version)
                .map(|release| &release.ros)
                .ok_or_else(|| invalid(format!("This tool does not support Gazebo {version}.")))?,
        ),
        None => None,
    };

    if let Some(ros) = &ros {
        if official.is_none() {
            return Err(invalid(format!(
                "'{ros}' is not a valid/supported ROS distribution."
            )));
        }
        if let (Some(version), Some(supported)) = (gazebo_version, supported_ros)
            && !supported.contains(ros)
        {
            return Err(invalid(format!(
                "Gazebo {version} is not compatible with ROS {ros}!"
            )));
        }
    }

    if let (Some(ros), Some(official), Some(version)) = (&ros, official, gazebo_version)
        && official != version
        && !request.confirm
    {
        return Err(invalid(format!(
            "Unofficial Gazebo {version} + ROS {ros} version selected! \
             We recommend using Gazebo {official} + ROS {ros}. \
             If you know what you are doing, add --yes to confirm the selection."
        )));
    }

    let gazebo_version =
        gazebo_version.ok_or_else(|| invalid("Gazebo version was not specified.".to_string()))?;

    Ok(SpawnPlan {
        gazebo_version,
        ros_distro: ros,
        world_config: request.world_config.clone(),
        pull_request: request.pull_request.clone(),
    })
}
