pub(crate) mod docker_manager;

pub use docker_manager::DockerManager;
