//! The NPC decision core: flow-field maps, goals, waypoints, role AI

pub mod dijkstra;
pub mod goals;
pub mod roles;
pub mod waypoints;
