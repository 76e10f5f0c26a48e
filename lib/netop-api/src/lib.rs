//! Net Operator API types and CRDs for Kubernetes integration
//!
//! This library defines the custom resources contributed by the net operator:
//! - VSphereDistributedNetwork: a cluster-scoped network backed by a vSphere
//!   Distributed PortGroup on a vSphere Distributed Switch
//! - VSphereDistributedNetworkList: the list wrapper for the above
//!
//! Types are added to a [`Scheme`] through [`v1alpha1::add_to_scheme`], which
//! a hosting binary calls once during startup.

pub mod scheme;
pub mod v1alpha1;

pub use scheme::{KnownType, Scheme, SchemeError, SchemeObject, Scope};
pub use v1alpha1::{VSphereDistributedNetwork, VSphereDistributedNetworkList};
