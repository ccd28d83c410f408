//! Serde world descriptions.
//!
//! A description is plain data: it names models, links, collisions and
//! joints and gives their initial poses and physical parameters. Loading
//! always validates, so a backend handed a [`WorldDescription`] can rely on
//! unique names and resolvable joint links.
//!
//! Angles are radians, lengths metres, times seconds.

use std::collections::BTreeSet;
use std::path::Path;

use featherstone_common::Pose3d;
use glam::{DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

/// Errors from loading or validating a description.
#[derive(Debug, thiserror::Error)]
pub enum DescribeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid description: {0}")]
    Validation(String),
}

fn default_gravity() -> DVec3 {
    DVec3::new(0.0, 0.0, -9.8)
}

fn default_time_step() -> f64 {
    0.001
}

fn default_mass() -> f64 {
    1.0
}

fn default_inertia() -> DVec3 {
    DVec3::ONE
}

fn default_friction() -> f64 {
    1.0
}

fn default_axis() -> DVec3 {
    DVec3::Z
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldDescription {
    pub name: String,
    #[serde(default = "default_gravity")]
    pub gravity: DVec3,
    /// Seconds advanced per step unless a step overrides it.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    #[serde(default)]
    pub models: Vec<ModelDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub name: String,
    #[serde(default)]
    pub pose: PoseDescription,
    /// Fixed models ignore gravity and never move when stepped.
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub links: Vec<LinkDescription>,
    #[serde(default)]
    pub joints: Vec<JointDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub name: String,
    /// Relative to the model.
    #[serde(default)]
    pub pose: PoseDescription,
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Principal moments.
    #[serde(default = "default_inertia")]
    pub inertia: DVec3,
    #[serde(default)]
    pub collisions: Vec<CollisionDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionDescription {
    pub name: String,
    /// Relative to the link.
    #[serde(default)]
    pub pose: PoseDescription,
    pub geometry: Geometry,
    #[serde(default = "default_friction")]
    pub friction: f64,
    #[serde(default)]
    pub restitution: f64,
}

/// Collision geometry, centered on the collision frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    /// Full edge lengths.
    Box { size: DVec3 },
    Sphere { radius: f64 },
    /// Axis along local z.
    Cylinder { radius: f64, length: f64 },
}

impl Geometry {
    /// Half extents of the local bounding box.
    pub fn half_extents(&self) -> DVec3 {
        match *self {
            Geometry::Box { size } => size * 0.5,
            Geometry::Sphere { radius } => DVec3::splat(radius),
            Geometry::Cylinder { radius, length } => DVec3::new(radius, radius, length * 0.5),
        }
    }

    fn is_positive(&self) -> bool {
        match *self {
            Geometry::Box { size } => size.min_element() > 0.0,
            Geometry::Sphere { radius } => radius > 0.0,
            Geometry::Cylinder { radius, length } => radius > 0.0 && length > 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    #[default]
    Fixed,
    Revolute,
    Prismatic,
    Ball,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDescription {
    pub name: String,
    #[serde(default)]
    pub kind: JointKind,
    /// Parent link name; `None` attaches the child to the world.
    #[serde(default)]
    pub parent: Option<String>,
    pub child: String,
    #[serde(default = "default_axis")]
    pub axis: DVec3,
}

/// Position plus roll/pitch/yaw, the way description files spell poses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseDescription {
    #[serde(default)]
    pub position: DVec3,
    /// Roll, pitch, yaw about fixed x, y, z.
    #[serde(default)]
    pub rpy: DVec3,
}

impl PoseDescription {
    pub fn to_pose(&self) -> Pose3d {
        let rotation = DQuat::from_euler(EulerRot::ZYX, self.rpy.z, self.rpy.y, self.rpy.x);
        Pose3d::new(self.position, rotation)
    }
}

impl WorldDescription {
    pub fn from_yaml_str(text: &str) -> Result<Self, DescribeError> {
        let description: Self = serde_yaml::from_str(text)?;
        description.validate()?;
        Ok(description)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DescribeError> {
        let description: Self = serde_json::from_str(text)?;
        description.validate()?;
        Ok(description)
    }

    /// Load a file. `.json` files are read as JSON, everything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DescribeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, DescribeError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), DescribeError> {
        if self.name.is_empty() {
            return invalid("world name is empty".into());
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return invalid(format!("world `{}`: time step must be positive", self.name));
        }
        let mut models = BTreeSet::new();
        for model in &self.models {
            if !models.insert(model.name.as_str()) {
                return invalid(format!("duplicate model `{}`", model.name));
            }
            model.validate()?;
        }
        Ok(())
    }

    /// Total number of links across every model.
    pub fn link_count(&self) -> usize {
        self.models.iter().map(|m| m.links.len()).sum()
    }
}

impl ModelDescription {
    fn validate(&self) -> Result<(), DescribeError> {
        let mut links = BTreeSet::new();
        for link in &self.links {
            if !links.insert(link.name.as_str()) {
                return invalid(format!("model `{}`: duplicate link `{}`", self.name, link.name));
            }
            if link.mass.is_nan() || link.mass <= 0.0 {
                return invalid(format!("link `{}`: mass must be positive", link.name));
            }
            let mut collisions = BTreeSet::new();
            for collision in &link.collisions {
                if !collisions.insert(collision.name.as_str()) {
                    return invalid(format!(
                        "link `{}`: duplicate collision `{}`",
                        link.name, collision.name
                    ));
                }
                if !collision.geometry.is_positive() {
                    return invalid(format!(
                        "collision `{}`: geometry sizes must be positive",
                        collision.name
                    ));
                }
            }
        }

        let mut joints = BTreeSet::new();
        for joint in &self.joints {
            if !joints.insert(joint.name.as_str()) {
                return invalid(format!("model `{}`: duplicate joint `{}`", self.name, joint.name));
            }
            if !links.contains(joint.child.as_str()) {
                return invalid(format!(
                    "joint `{}`: unknown child link `{}`",
                    joint.name, joint.child
                ));
            }
            if let Some(parent) = &joint.parent {
                if !links.contains(parent.as_str()) {
                    return invalid(format!(
                        "joint `{}`: unknown parent link `{parent}`",
                        joint.name
                    ));
                }
                if parent == &joint.child {
                    return invalid(format!(
                        "joint `{}`: link `{parent}` joined to itself",
                        joint.name
                    ));
                }
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> Result<(), DescribeError> {
    Err(DescribeError::Validation(message))
}
