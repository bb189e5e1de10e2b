use std::time::Duration;

use crate::error::{RenderFault, TeleportError};
use crate::gfx::{
    camera::motion::MotionController,
    picking::{RayHit, RayPicker},
    scene::{NodeHandle, OutlineStyle, RenderBackend},
};
use crate::input::PointerEvent;
use crate::navigation::{BoundsValidator, NavigableRegion};

use super::registry::{ObjectInfo, SpatialRegistry};

/// What a click did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionOutcome {
    /// Metadata of the selected object, if the click selected one
    pub object_info: Option<ObjectInfo>,
    /// Whether a teleport was started
    pub teleported: bool,
    /// Backend fault message; the click had no effect
    pub error: Option<String>,
}

impl InteractionOutcome {
    pub fn selected(info: ObjectInfo) -> Self {
        Self {
            object_info: Some(info),
            ..Self::default()
        }
    }

    pub fn teleport() -> Self {
        Self {
            teleported: true,
            ..Self::default()
        }
    }

    pub fn failed(fault: &RenderFault) -> Self {
        Self {
            error: Some(fault.to_string()),
            ..Self::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.object_info.is_none() && !self.teleported && self.error.is_none()
    }
}

enum HitAction<'a> {
    Teleport,
    Busy,
    Select(NodeHandle, &'a ObjectInfo),
    Skip,
}

/// Turns clicks into either a floor teleport or an object selection.
pub struct InteractionCoordinator {
    picker: RayPicker,
    validator: BoundsValidator,
    region: NavigableRegion,
    floor_name: String,
    outline_style: OutlineStyle,
    selected: Option<NodeHandle>,
}

impl InteractionCoordinator {
    pub fn new(
        validator: BoundsValidator,
        region: NavigableRegion,
        floor_name: impl Into<String>,
        outline_style: OutlineStyle,
    ) -> Self {
        Self {
            picker: RayPicker::new(),
            validator,
            region,
            floor_name: floor_name.into(),
            outline_style,
            selected: None,
        }
    }

    pub fn set_region(&mut self, region: NavigableRegion) {
        self.region = region;
    }

    pub fn outline_style(&self) -> &OutlineStyle {
        &self.outline_style
    }

    /// Registered root of the object selected by the last click.
    pub fn selected(&self) -> Option<NodeHandle> {
        self.selected
    }

    /// Forgets the current selection without touching the backend.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Handles one click.
    ///
    /// Hits are scanned nearest first. A floor hit the validator accepts starts
    /// a teleport; a rejected floor hit lets the scan continue to whatever lies
    /// behind it. The first hit that resolves to a registered object is
    /// outlined and its metadata returned. Any prior outline is cleared first.
    ///
    /// The outline pulse is sampled at the event timestamp. Use
    /// [`handle_click_at`](Self::handle_click_at) to sample it on another clock.
    pub fn handle_click<B: RenderBackend + ?Sized>(
        &mut self,
        event: &PointerEvent,
        backend: Option<&mut B>,
        registry: &SpatialRegistry,
        motion: &mut MotionController,
    ) -> InteractionOutcome {
        self.handle_click_at(event, event.timestamp, backend, registry, motion)
    }

    /// [`handle_click`](Self::handle_click) with the outline pulse sampled at `now`.
    pub fn handle_click_at<B: RenderBackend + ?Sized>(
        &mut self,
        event: &PointerEvent,
        now: Duration,
        mut backend: Option<&mut B>,
        registry: &SpatialRegistry,
        motion: &mut MotionController,
    ) -> InteractionOutcome {
        if motion.is_disposed() {
            return InteractionOutcome::default();
        }

        let hits = match self.picker.pick(event, motion.camera(), backend.as_deref()) {
            Ok(hits) => hits,
            Err(fault) => {
                log::warn!("pick failed: {fault}");
                return InteractionOutcome::failed(&fault);
            }
        };

        let Some(backend) = backend.as_deref_mut() else {
            return InteractionOutcome::default();
        };

        if let Err(fault) = backend.clear_outline() {
            log::warn!("failed to clear outline: {fault}");
            return InteractionOutcome::failed(&fault);
        }
        self.selected = None;

        for hit in &hits {
            match self.classify(hit, &*backend, registry, motion) {
                HitAction::Teleport => return InteractionOutcome::teleport(),
                HitAction::Busy => return InteractionOutcome::default(),
                HitAction::Skip => continue,
                HitAction::Select(root, info) => {
                    if let Some(bounds) = backend.world_bounds(root) {
                        let outline = self
                            .outline_style
                            .outline_for(root, bounds, now);
                        if let Err(fault) = backend.show_outline(&outline) {
                            log::warn!("failed to show outline: {fault}");
                            return InteractionOutcome::failed(&fault);
                        }
                    }
                    self.selected = Some(root);
                    log::debug!("selected '{}'", info.name);
                    return InteractionOutcome::selected(info.clone());
                }
            }
        }

        InteractionOutcome::default()
    }

    fn classify<'r, B: RenderBackend + ?Sized>(
        &self,
        hit: &RayHit,
        backend: &B,
        registry: &'r SpatialRegistry,
        motion: &mut MotionController,
    ) -> HitAction<'r> {
        if backend.name(hit.node) == Some(self.floor_name.as_str()) {
            let started = self
                .validator
                .validate(hit.point, &self.region)
                .ok_or(TeleportError::Rejected)
                .and_then(|target| motion.teleport_to(target));
            return match started {
                Ok(()) => HitAction::Teleport,
                Err(TeleportError::Rejected) => {
                    log::debug!("floor hit at {:?} rejected", hit.point);
                    HitAction::Skip
                }
                Err(err @ (TeleportError::InProgress | TeleportError::Disposed)) => {
                    log::debug!("teleport not started: {err}");
                    HitAction::Busy
                }
            };
        }

        match registry.resolve(hit.node, backend) {
            Some((root, info)) => HitAction::Select(root, info),
            None => HitAction::Skip,
        }
    }
}
