use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::loader::parse_catalog;
use super::types::{Animation, AnimationFlags, AnimationId};
use crate::sim::{ChoiceList, ChoiceListError, FrameListError};

const BUILTIN_CATALOG_JSON: &str = include_str!("../../assets/sheep.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("animation at position {position} has id {id}; ids must equal their 1-based position")]
    IdMismatch { position: usize, id: AnimationId },
    #[error("catalog has no animation flagged {flag}")]
    MissingRole { flag: &'static str },
    #[error("fallback animation {id} is not in the catalog")]
    UnknownFallback { id: AnimationId },
    #[error("animation {from} references unknown animation {to}")]
    DanglingReference { from: AnimationId, to: AnimationId },
    #[error("animations unreachable from any choice list or role: {ids:?}")]
    Unreachable { ids: Vec<AnimationId> },
    #[error("invalid {list} choice list: {source}")]
    ChoiceList {
        list: &'static str,
        #[source]
        source: ChoiceListError,
    },
    #[error("invalid weighted transition in animation {animation}: {source}")]
    Transition {
        animation: AnimationId,
        #[source]
        source: ChoiceListError,
    },
    #[error("invalid frames in animation {animation} scene {scene}: {source}")]
    Frames {
        animation: AnimationId,
        scene: usize,
        #[source]
        source: FrameListError,
    },
    #[error("parse catalog json: {message}")]
    Parse { message: String },
    #[error("parse catalog json at {path}: {message}")]
    ParseAt { path: String, message: String },
    #[error("read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ordered animation definitions plus the roles and choice lists the
/// simulation draws from.
#[derive(Debug, Clone)]
pub struct Catalog {
    animations: Vec<Animation>,
    fallback: AnimationId,
    falling: AnimationId,
    dragging: AnimationId,
    first_choice: ChoiceList,
    entrance_choice: ChoiceList,
    default_choice: ChoiceList,
}

impl Catalog {
    pub fn new(animations: Vec<Animation>, fallback: AnimationId) -> Result<Self, CatalogError> {
        for (position, animation) in animations.iter().enumerate() {
            if animation.id.index() != Some(position) {
                return Err(CatalogError::IdMismatch {
                    position: position + 1,
                    id: animation.id,
                });
            }
        }
        let fallback_exists = fallback
            .index()
            .is_some_and(|index| index < animations.len());
        if !fallback_exists {
            return Err(CatalogError::UnknownFallback { id: fallback });
        }

        let falling = find_role(&animations, AnimationFlags::FALLING, "Falling")?;
        let dragging = find_role(&animations, AnimationFlags::DRAGGING, "Dragging")?;
        let first_choice = build_choice_list(&animations, AnimationFlags::FIRST_CHOICE, "FirstChoice")?;
        let entrance_choice =
            build_choice_list(&animations, AnimationFlags::ENTRANCE_CHOICE, "EntranceChoice")?;
        let default_choice =
            build_choice_list(&animations, AnimationFlags::DEFAULT_CHOICE, "DefaultChoice")?;

        Ok(Self {
            animations,
            fallback,
            falling,
            dragging,
            first_choice,
            entrance_choice,
            default_choice,
        })
    }

    /// The sheep catalog bundled with the engine.
    pub fn builtin() -> Result<Self, CatalogError> {
        parse_catalog(BUILTIN_CATALOG_JSON)
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        id.index().and_then(|index| self.animations.get(index))
    }

    pub fn by_name(&self, name: &str) -> Option<&Animation> {
        self.animations
            .iter()
            .find(|animation| animation.name == name)
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn fallback(&self) -> AnimationId {
        self.fallback
    }

    pub fn falling(&self) -> AnimationId {
        self.falling
    }

    pub fn dragging(&self) -> AnimationId {
        self.dragging
    }

    pub fn first_choice(&self) -> &ChoiceList {
        &self.first_choice
    }

    pub fn entrance_choice(&self) -> &ChoiceList {
        &self.entrance_choice
    }

    pub fn default_choice(&self) -> &ChoiceList {
        &self.default_choice
    }
}

fn find_role(
    animations: &[Animation],
    flag: AnimationFlags,
    label: &'static str,
) -> Result<AnimationId, CatalogError> {
    animations
        .iter()
        .find(|animation| animation.flags.contains(flag))
        .map(|animation| animation.id)
        .ok_or(CatalogError::MissingRole { flag: label })
}

fn build_choice_list(
    animations: &[Animation],
    flag: AnimationFlags,
    label: &'static str,
) -> Result<ChoiceList, CatalogError> {
    let entries = animations
        .iter()
        .filter(|animation| animation.flags.contains(flag))
        .map(|animation| (animation.id, animation.weight))
        .collect::<Vec<_>>();
    if entries.is_empty() {
        return Err(CatalogError::MissingRole { flag: label });
    }
    ChoiceList::new(entries).map_err(|source| CatalogError::ChoiceList {
        list: label,
        source,
    })
}
