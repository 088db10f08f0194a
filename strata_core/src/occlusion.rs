// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The occlusion layer stack and the clip-container forest.
//!
//! Native elements are placed by `(container, layer)`: the layer decides
//! paint order against canvas content, the container decides clipping.
//! Containers are logical; each layer that holds a member of a container
//! gets its own DOM instantiation of it, created on first use together
//! with instantiations of all its ancestors.
//!
//! ```text
//!  mount
//!  ├── canvas 0   ├── overlay 0
//!  │              │   └── container 3 (layer 0)
//!  │              │       └── container 5 (layer 0) ── leaf
//!  ├── canvas 1   └── overlay 1
//!  │                  └── container 3 (layer 1) ── leaf
//!  …
//! ```

use alloc::collections::BTreeMap;
use alloc::string::ToString as _;
use alloc::vec::Vec;

use crate::container::{
    CONTAINER_CLASS, CONTAINER_ID_ATTRIBUTE, Container, ContainerPatch, clip_property,
    clip_reference,
};
use crate::dom::{Dom, ElementKind, NodeId, OwnedNode};
use crate::error::{Error, Result};
use crate::layer::{Host, Layer, SurfaceRegistry};

/// Owns the layers under a mount node and the containers placed in them.
#[derive(Debug)]
pub struct OcclusionLayerManager {
    mount: NodeId,
    layers: Vec<Layer>,
    surfaces: SurfaceRegistry,
    containers: BTreeMap<u32, Container>,
    /// DOM instantiations keyed by `(container, layer)`.
    instances: BTreeMap<(u32, u32), OwnedNode>,
}

impl OcclusionLayerManager {
    /// Takes over `mount` and creates layer 0 in it.
    ///
    /// # Errors
    ///
    /// Fails if the node pools are incomplete.
    pub fn attach<D: Dom>(host: &mut Host<'_, D>, mount: NodeId) -> Result<Self> {
        let mut surfaces = SurfaceRegistry::new();
        let base = Layer::build(host, &mut surfaces, mount, 0)?;
        Ok(Self {
            mount,
            layers: alloc::vec![base],
            surfaces,
            containers: BTreeMap::new(),
            instances: BTreeMap::new(),
        })
    }

    /// The node layers are appended to.
    #[must_use]
    pub fn mount(&self) -> NodeId {
        self.mount
    }

    /// Number of live layers. Always at least one.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layer `index`, if it exists.
    #[must_use]
    pub fn layer(&self, index: u32) -> Option<&Layer> {
        self.layers.get(index as usize)
    }

    /// Drawing surfaces of all live layers.
    #[must_use]
    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    /// Ensures layers `0..=top` exist.
    ///
    /// # Errors
    ///
    /// Fails if the node pools are incomplete.
    pub fn grow_to<D: Dom>(&mut self, host: &mut Host<'_, D>, top: u32) -> Result<()> {
        let before = self.layers.len();
        while self.layers.len() <= top as usize {
            let index = self.next_index();
            let layer = Layer::build(host, &mut self.surfaces, self.mount, index)?;
            self.layers.push(layer);
        }
        if self.layers.len() != before {
            log::debug!("grew occlusion stack from {before} to {} layers", self.layers.len());
        }
        Ok(())
    }

    /// Removes every layer above `top`, along with the container
    /// instantiations they held.
    ///
    /// # Errors
    ///
    /// [`Error::LayerInUse`] if a layer above `top` still holds an element;
    /// nothing is removed then. Also fails if the node pools are incomplete.
    pub fn shrink_to<D: Dom>(&mut self, host: &mut Host<'_, D>, top: u32) -> Result<()> {
        for layer in self.layers.iter().skip(top as usize + 1) {
            let members = self.members(host.dom, layer);
            if members > 0 {
                return Err(Error::LayerInUse {
                    layer: layer.index(),
                    members,
                });
            }
        }
        let before = self.layers.len();
        while self.layers.len() > top as usize + 1 {
            let Some(layer) = self.layers.pop() else {
                break;
            };
            let index = layer.index();
            let stale: Vec<_> = self
                .instances
                .keys()
                .filter(|&&(_, l)| l == index)
                .copied()
                .collect();
            for key in stale {
                if let Some(node) = self.instances.remove(&key) {
                    host.pools.put(&ElementKind::Div, host.dom, node)?;
                }
            }
            layer.clean_up(host, &mut self.surfaces)?;
        }
        if self.layers.len() != before {
            log::debug!("shrank occlusion stack from {before} to {} layers", self.layers.len());
        }
        Ok(())
    }

    /// Native nodes placed on `layer`.
    ///
    /// Every container instantiation is the child of exactly one node in
    /// the layer, so any children beyond the instantiations are elements.
    fn members<D: Dom>(&self, dom: &D, layer: &Layer) -> usize {
        let index = layer.index();
        let instances: Vec<NodeId> = self
            .instances
            .iter()
            .filter(|&(&(_, l), _)| l == index)
            .map(|(_, node)| node.id())
            .collect();
        let children: usize = core::iter::once(layer.overlay())
            .chain(instances.iter().copied())
            .map(|node| dom.child_count(node))
            .sum();
        children.saturating_sub(instances.len())
    }

    fn next_index(&self) -> u32 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "layer indices come from u32 patch fields"
        )]
        let index = self.layers.len() as u32;
        index
    }

    /// Appends `node` under container `parent` (or directly in the overlay)
    /// at layer `layer`, growing the stack and instantiating containers as
    /// needed.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownContainer`] if `parent` or one of its ancestors does
    /// not exist.
    pub fn add_element<D: Dom>(
        &mut self,
        host: &mut Host<'_, D>,
        node: NodeId,
        parent: Option<u32>,
        layer: u32,
    ) -> Result<()> {
        self.grow_to(host, layer)?;
        let target = self.attach_point(host, parent, layer)?;
        host.dom.append_child(target, node);
        Ok(())
    }

    fn attach_point<D: Dom>(
        &mut self,
        host: &mut Host<'_, D>,
        container: Option<u32>,
        layer: u32,
    ) -> Result<NodeId> {
        // Callers grow the stack to `layer` first.
        let Some(id) = container else {
            return Ok(self.layers[layer as usize].overlay());
        };
        if let Some(instance) = self.instances.get(&(id, layer)) {
            return Ok(instance.id());
        }
        let parent = self
            .containers
            .get(&id)
            .ok_or(Error::UnknownContainer(id))?
            .parent;
        let parent_node = self.attach_point(host, parent, layer)?;

        let instance = host.pools.get(&ElementKind::Div, host.dom)?;
        let reference = clip_reference(id);
        let dom = &mut *host.dom;
        dom.set_attribute(instance.id(), "class", CONTAINER_CLASS);
        dom.set_attribute(instance.id(), CONTAINER_ID_ATTRIBUTE, &id.to_string());
        dom.set_style(instance.id(), "clip-path", &reference);
        dom.set_style(instance.id(), "-webkit-clip-path", &reference);
        dom.append_child(parent_node, instance.id());

        let node = instance.id();
        self.instances.insert((id, layer), instance);
        Ok(node)
    }

    /// Registers container `id` nested in `parent`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateContainer`] if `id` exists, and
    /// [`Error::UnknownContainer`] if `parent` does not.
    pub fn add_container(&mut self, id: u32, parent: Option<u32>) -> Result<()> {
        if self.containers.contains_key(&id) {
            return Err(Error::DuplicateContainer(id));
        }
        if let Some(parent) = parent
            && !self.containers.contains_key(&parent)
        {
            return Err(Error::UnknownContainer(parent));
        }
        self.containers.insert(id, Container::new(parent));
        Ok(())
    }

    /// Merges `patch` into container `id` and republishes its clip path.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownContainer`] if `id` does not exist.
    pub fn update_container<D: Dom>(
        &mut self,
        dom: &mut D,
        id: u32,
        patch: &ContainerPatch,
    ) -> Result<()> {
        let container = self
            .containers
            .get_mut(&id)
            .ok_or(Error::UnknownContainer(id))?;
        container.merge(patch);
        dom.set_root_property(&clip_property(id), &container.clip_path_css());
        Ok(())
    }

    /// Removes container `id`, its instantiations, and its clip path.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownContainer`] if `id` does not exist, and
    /// [`Error::ContainerInUse`] if any instantiation still has children;
    /// in that case nothing changes.
    pub fn remove_container<D: Dom>(&mut self, host: &mut Host<'_, D>, id: u32) -> Result<()> {
        if !self.containers.contains_key(&id) {
            return Err(Error::UnknownContainer(id));
        }
        let members: usize = self
            .instances_of(id)
            .map(|(_, node)| host.dom.child_count(node))
            .sum();
        if members > 0 {
            return Err(Error::ContainerInUse { id, members });
        }

        let layers: Vec<u32> = self.instances_of(id).map(|(layer, _)| layer).collect();
        for layer in layers {
            if let Some(instance) = self.instances.remove(&(id, layer)) {
                host.pools.put(&ElementKind::Div, host.dom, instance)?;
            }
        }
        self.containers.remove(&id);
        host.dom.remove_root_property(&clip_property(id));
        Ok(())
    }

    /// Logical state of container `id`.
    #[must_use]
    pub fn container(&self, id: u32) -> Option<&Container> {
        self.containers.get(&id)
    }

    /// The instantiation of container `id` in layer `layer`, if any.
    #[must_use]
    pub fn container_instance(&self, id: u32, layer: u32) -> Option<NodeId> {
        self.instances.get(&(id, layer)).map(OwnedNode::id)
    }

    fn instances_of(&self, id: u32) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.instances
            .range((id, 0)..=(id, u32::MAX))
            .map(|(&(_, layer), node)| (layer, node.id()))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::dom::{MemoryDom, NodePools, node_pools};
    use crate::layer::SurfaceId;
    use crate::testing::RecordingLink;

    struct Fixture {
        dom: MemoryDom,
        pools: NodePools<MemoryDom>,
        core: RecordingLink,
        mount: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut dom = MemoryDom::new();
            let mount = dom.create_element(ElementKind::Div);
            Self {
                dom,
                pools: node_pools(),
                core: RecordingLink::default(),
                mount,
            }
        }

        fn host(&mut self) -> Host<'_, MemoryDom> {
            Host {
                dom: &mut self.dom,
                pools: &mut self.pools,
                core: &mut self.core,
            }
        }

        fn manager(&mut self) -> OcclusionLayerManager {
            let mount = self.mount;
            OcclusionLayerManager::attach(&mut self.host(), mount).unwrap()
        }

        /// `(class, z-index)` of every mount child in DOM order.
        fn paint_order(&self) -> Vec<(alloc::string::String, alloc::string::String)> {
            self.dom
                .children(self.mount)
                .iter()
                .map(|&n| {
                    (
                        self.dom.attribute(n, "class").unwrap_or_default().into(),
                        self.dom.style(n, "z-index").unwrap_or_default().into(),
                    )
                })
                .collect()
        }
    }

    #[test]
    fn attach_creates_one_layer() {
        let mut fx = Fixture::new();
        let manager = fx.manager();
        assert_eq!(manager.layer_count(), 1);
        assert_eq!(fx.core.added, [SurfaceId(0)]);
        assert_eq!(fx.dom.children(fx.mount).len(), 2);
    }

    #[test]
    fn regrow_after_shrink_matches_fresh_stack() {
        let mut fresh = Fixture::new();
        let mut manager = fresh.manager();
        manager.grow_to(&mut fresh.host(), 3).unwrap();
        let expected = fresh.paint_order();

        let mut fx = Fixture::new();
        let mut manager = fx.manager();
        manager.grow_to(&mut fx.host(), 3).unwrap();
        manager.shrink_to(&mut fx.host(), 1).unwrap();
        assert_eq!(manager.layer_count(), 2);
        assert_eq!(manager.surfaces().len(), 2);
        manager.grow_to(&mut fx.host(), 3).unwrap();

        assert_eq!(manager.layer_count(), 4);
        assert_eq!(fx.paint_order(), expected);
        assert_eq!(
            manager.surfaces().iter().map(|(id, _)| id).collect::<Vec<_>>(),
            [SurfaceId(0), SurfaceId(1), SurfaceId(2), SurfaceId(3)]
        );
        assert_eq!(fx.core.removed, [SurfaceId(3), SurfaceId(2)]);
        let canvases = fx.pools.pool(&ElementKind::Canvas).unwrap();
        assert_eq!(canvases.created(), 4, "regrown layers must reuse pooled canvases");
    }

    #[test]
    fn grow_is_monotonic() {
        let mut fx = Fixture::new();
        let mut manager = fx.manager();
        manager.grow_to(&mut fx.host(), 2).unwrap();
        manager.grow_to(&mut fx.host(), 1).unwrap();
        assert_eq!(manager.layer_count(), 3);
    }

    #[test]
    fn add_element_materializes_ancestors() {
        let mut fx = Fixture::new();
        let mut manager = fx.manager();
        manager.add_container(1, None).unwrap();
        manager.add_container(2, Some(1)).unwrap();
        let leaf = fx.dom.create_element(ElementKind::Div);

        manager.add_element(&mut fx.host(), leaf, Some(2), 1).unwrap();

        assert_eq!(manager.layer_count(), 2);
        let outer = manager.container_instance(1, 1).unwrap();
        let inner = manager.container_instance(2, 1).unwrap();
        assert_eq!(fx.dom.parent(leaf), Some(inner));
        assert_eq!(fx.dom.parent(inner), Some(outer));
        assert_eq!(fx.dom.parent(outer), manager.layer(1).map(Layer::overlay));
        assert_eq!(fx.dom.attribute(inner, CONTAINER_ID_ATTRIBUTE), Some("2"));
        assert_eq!(
            fx.dom.style(inner, "clip-path"),
            Some("var(--container-2-clip-path)")
        );
        assert_eq!(manager.container_instance(1, 0), None, "layer 0 was never used");
    }

    #[test]
    fn unknown_container_is_rejected() {
        let mut fx = Fixture::new();
        let mut manager = fx.manager();
        let leaf = fx.dom.create_element(ElementKind::Div);
        assert_eq!(
            manager.add_element(&mut fx.host(), leaf, Some(9), 0),
            Err(Error::UnknownContainer(9))
        );
        assert_eq!(manager.add_container(3, Some(9)), Err(Error::UnknownContainer(9)));
        manager.add_container(3, None).unwrap();
        assert_eq!(manager.add_container(3, None), Err(Error::DuplicateContainer(3)));
    }

    #[test]
    fn update_publishes_one_property_for_all_layers() {
        let mut fx = Fixture::new();
        let mut manager = fx.manager();
        manager.add_container(4, None).unwrap();
        for layer in [0, 2] {
            let leaf = fx.dom.create_element(ElementKind::Div);
            manager.add_element(&mut fx.host(), leaf, Some(4), layer).unwrap();
        }
        manager
            .update_container(
                &mut fx.dom,
                4,
                &ContainerPatch {
                    width: Some(100.0),
                    height: Some(50.0),
                    transform: None,
                },
            )
            .unwrap();
        assert_eq!(
            fx.dom.root_property("--container-4-clip-path"),
            Some("polygon(0px 0px, 100px 0px, 100px 50px, 0px 50px)")
        );
        assert_eq!(fx.dom.root_property_count(), 1);
        assert_eq!(
            manager.update_container(&mut fx.dom, 5, &ContainerPatch::default()),
            Err(Error::UnknownContainer(5))
        );
    }

    #[test]
    fn removal_requires_no_members() {
        let mut fx = Fixture::new();
        let mut manager = fx.manager();
        manager.add_container(7, None).unwrap();
        manager
            .update_container(&mut fx.dom, 7, &ContainerPatch::default())
            .unwrap();
        let leaf = fx.dom.create_element(ElementKind::Div);
        manager.add_element(&mut fx.host(), leaf, Some(7), 0).unwrap();

        assert_eq!(
            manager.remove_container(&mut fx.host(), 7),
            Err(Error::ContainerInUse { id: 7, members: 1 })
        );
        assert!(manager.container(7).is_some(), "rejected removal must not mutate");
        assert!(manager.container_instance(7, 0).is_some());
        assert!(fx.dom.root_property("--container-7-clip-path").is_some());

        fx.dom.detach(leaf);
        manager.remove_container(&mut fx.host(), 7).unwrap();
        assert!(manager.container(7).is_none());
        assert_eq!(manager.container_instance(7, 0), None);
        assert_eq!(fx.dom.root_property("--container-7-clip-path"), None);
        assert_eq!(
            manager.remove_container(&mut fx.host(), 7),
            Err(Error::UnknownContainer(7))
        );
    }

    #[test]
    fn shrink_returns_container_instances() {
        let mut fx = Fixture::new();
        let mut manager = fx.manager();
        manager.add_container(1, None).unwrap();
        let leaf = fx.dom.create_element(ElementKind::Div);
        manager.add_element(&mut fx.host(), leaf, Some(1), 2).unwrap();
        fx.dom.detach(leaf);
        manager.shrink_to(&mut fx.host(), 0).unwrap();
        assert_eq!(manager.container_instance(1, 2), None);
        assert_eq!(manager.layer_count(), 1);
        assert_eq!(fx.dom.children(fx.mount).len(), 2);
        assert_eq!(vec![SurfaceId(2), SurfaceId(1)], fx.core.removed);
    }

    #[test]
    fn shrink_keeps_occupied_layers() {
        let mut fx = Fixture::new();
        let mut manager = fx.manager();
        manager.add_container(1, None).unwrap();
        manager.add_container(2, Some(1)).unwrap();
        let nested = fx.dom.create_element(ElementKind::Div);
        manager.add_element(&mut fx.host(), nested, Some(2), 2).unwrap();
        let bare = fx.dom.create_element(ElementKind::Div);
        manager.add_element(&mut fx.host(), bare, None, 1).unwrap();

        assert_eq!(
            manager.shrink_to(&mut fx.host(), 0),
            Err(Error::LayerInUse {
                layer: 1,
                members: 1
            })
        );
        assert_eq!(manager.layer_count(), 3, "rejected shrink must not mutate");
        assert!(fx.core.removed.is_empty());

        assert_eq!(
            manager.shrink_to(&mut fx.host(), 1),
            Err(Error::LayerInUse {
                layer: 2,
                members: 1
            })
        );
        fx.dom.detach(nested);
        manager.shrink_to(&mut fx.host(), 1).unwrap();
        assert_eq!(manager.layer_count(), 2);
        assert_eq!(fx.dom.parent(bare), manager.layer(1).map(Layer::overlay));
    }
}
