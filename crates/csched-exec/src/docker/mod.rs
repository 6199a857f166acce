//! [`Runtime`] over the Docker Engine API.

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::{
    Docker,
    container::{
        InspectContainerOptions, ListContainersOptions, LogOutput, StartContainerOptions,
        WaitContainerOptions,
    },
    errors::Error as DockerError,
    exec::{CreateExecOptions, StartExecOptions, StartExecResults},
};
use futures_util::StreamExt;
use tracing::trace;

use csched_core::{OutputStream, Runtime, RuntimeError, UnitSummary, WaitStatus};
use csched_model::{LABEL_PROJECT, LABEL_SCHEDULE, LABEL_SERVICE, Labels};

#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Client configured from the environment (`DOCKER_HOST` and friends).
    pub fn connect() -> Result<Self, RuntimeError> {
        Docker::connect_with_defaults()
            .map(Self::from_client)
            .map_err(|e| RuntimeError::Connect(e.to_string()))
    }

    pub fn from_client(docker: Docker) -> Self {
        Self { docker }
    }
}

fn label_filters(project: &str) -> HashMap<String, Vec<String>> {
    HashMap::from([(
        "label".to_string(),
        vec![
            format!("{LABEL_PROJECT}={project}"),
            LABEL_SERVICE.to_string(),
            LABEL_SCHEDULE.to_string(),
        ],
    )])
}

fn api(e: DockerError) -> RuntimeError {
    match e {
        DockerError::DockerResponseServerError {
            status_code: 404,
            message,
        } => RuntimeError::NotFound(message),
        other => RuntimeError::Api(other.to_string()),
    }
}

#[async_trait]
impl Runtime for DockerRuntime {
    async fn list_units(&self, project: &str) -> Result<Vec<UnitSummary>, RuntimeError> {
        let opts = ListContainersOptions::<String> {
            all: true,
            filters: label_filters(project),
            ..Default::default()
        };
        let list = self.docker.list_containers(Some(opts)).await.map_err(api)?;
        trace!(target: "csched.exec.docker", project, found = list.len(), "containers listed");

        Ok(list
            .into_iter()
            .filter_map(|c| Some(UnitSummary::new(c.id?, c.labels.unwrap_or_default())))
            .collect())
    }

    async fn inspect_labels(&self, id: &str) -> Result<Labels, RuntimeError> {
        let info = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(api)?;
        Ok(info.config.and_then(|c| c.labels).unwrap_or_default())
    }

    async fn start(&self, id: &str) -> Result<(), RuntimeError> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(api)
    }

    async fn wait(&self, id: &str) -> Result<WaitStatus, RuntimeError> {
        let opts = WaitContainerOptions {
            condition: "not-running",
        };
        let mut stream = self.docker.wait_container(id, Some(opts));
        match stream.next().await {
            Some(Ok(res)) => Ok(WaitStatus {
                status_code: res.status_code,
                error: res.error.and_then(|e| e.message).filter(|m| !m.is_empty()),
            }),
            // non-zero exits surface as an error variant
            Some(Err(DockerError::DockerContainerWaitError { error, code })) => Ok(WaitStatus {
                status_code: code,
                error: (!error.is_empty()).then_some(error),
            }),
            Some(Err(e)) => Err(api(e)),
            None => Err(RuntimeError::Api(format!("wait {id}: stream closed"))),
        }
    }

    async fn exec_create(
        &self,
        id: &str,
        command: &[String],
        attach: bool,
    ) -> Result<String, RuntimeError> {
        let opts = CreateExecOptions {
            cmd: Some(command.to_vec()),
            attach_stdout: Some(attach),
            attach_stderr: Some(attach),
            ..Default::default()
        };
        let created = self.docker.create_exec(id, opts).await.map_err(api)?;
        Ok(created.id)
    }

    async fn exec_start(&self, exec_id: &str) -> Result<(), RuntimeError> {
        let opts = StartExecOptions {
            detach: true,
            ..Default::default()
        };
        self.docker
            .start_exec(exec_id, Some(opts))
            .await
            .map(|_| ())
            .map_err(api)
    }

    async fn exec_attach(&self, exec_id: &str) -> Result<OutputStream, RuntimeError> {
        let opts = StartExecOptions {
            detach: false,
            ..Default::default()
        };
        match self.docker.start_exec(exec_id, Some(opts)).await.map_err(api)? {
            StartExecResults::Attached { output, .. } => Ok(output
                .map(|chunk| chunk.map(LogOutput::into_bytes).map_err(api))
                .boxed()),
            StartExecResults::Detached => {
                Err(RuntimeError::Api(format!("exec {exec_id} started detached")))
            }
        }
    }

    async fn exec_exit_code(&self, exec_id: &str) -> Result<Option<i64>, RuntimeError> {
        let info = self.docker.inspect_exec(exec_id).await.map_err(api)?;
        if info.running == Some(true) {
            return Ok(None);
        }
        Ok(info.exit_code)
    }
}
