use std::sync::Arc;

use tokio::sync::Mutex;
use tonic::{Request, Response, Status};
use wifimap_common::MetricConfig;
use wifimap_core::{build_heat_field, find_metric, Contrast, HeatFieldOptions, ScaleMode, Surface};

use super::convert;
use super::wifimap::{
    samples_server::Samples, AddSampleRequest, CreateProjectRequest, Empty, FloorplanResponse,
    HeatmapRequest, HeatmapResponse, MetricsResponse, Project, ProjectRequest, ProjectsResponse,
    Sample, SamplesResponse, SetFloorplanRequest,
};
use crate::config::{HeatmapConfig, MeasureConfig};
use crate::measure::measure_sample;
use crate::scanner::ScanService;
use crate::store::ProjectStore;

/// Upper bound on grid points per heat map request
const MAX_HEATMAP_CELLS: f64 = 1_000_000.0;

pub struct SamplesService {
    store: Arc<Mutex<ProjectStore>>,
    scanner: Arc<ScanService>,
    metrics: Vec<MetricConfig>,
    measure: MeasureConfig,
    heatmap: HeatmapConfig,
}

impl SamplesService {
    pub fn new(
        store: Arc<Mutex<ProjectStore>>,
        scanner: Arc<ScanService>,
        metrics: Vec<MetricConfig>,
        measure: MeasureConfig,
        heatmap: HeatmapConfig,
    ) -> Self {
        Self {
            store,
            scanner,
            metrics,
            measure,
            heatmap,
        }
    }

    fn heat_field_options(&self, req: &HeatmapRequest) -> HeatFieldOptions {
        let contrast = if req.high_contrast {
            self.heatmap.high_contrast
        } else {
            self.heatmap.contrast
        };

        HeatFieldOptions {
            grid_step: self.heatmap.grid_step,
            idw: self.heatmap.idw(),
            scale: if req.auto_scale {
                ScaleMode::Auto
            } else {
                ScaleMode::Fixed
            },
            contrast: Contrast::Custom(contrast),
            band: convert::band_filter(&req.band),
        }
    }
}

#[tonic::async_trait]
impl Samples for SamplesService {
    async fn get_metrics(&self, _request: Request<Empty>) -> Result<Response<MetricsResponse>, Status> {
        Ok(Response::new(MetricsResponse {
            metrics: self.metrics.iter().map(convert::metric).collect(),
        }))
    }

    async fn list_projects(&self, _request: Request<Empty>) -> Result<Response<ProjectsResponse>, Status> {
        let store = self.store.lock().await;

        Ok(Response::new(ProjectsResponse {
            projects: store.projects().iter().map(convert::project).collect(),
        }))
    }

    async fn create_project(
        &self,
        request: Request<CreateProjectRequest>,
    ) -> Result<Response<Project>, Status> {
        let req = request.into_inner();
        let project = self
            .store
            .lock()
            .await
            .create_project(&req.name)
            .map_err(convert::store_status)?;

        Ok(Response::new(convert::project(&project)))
    }

    async fn list_samples(
        &self,
        request: Request<ProjectRequest>,
    ) -> Result<Response<SamplesResponse>, Status> {
        let req = request.into_inner();
        let store = self.store.lock().await;
        let project = store.project(&req.project).map_err(convert::store_status)?;

        Ok(Response::new(SamplesResponse {
            samples: project.samples.iter().map(convert::sample).collect(),
        }))
    }

    async fn add_sample(&self, request: Request<AddSampleRequest>) -> Result<Response<Sample>, Status> {
        let req = request.into_inner();
        let (x, y) = convert::position(req.x, req.y)?;

        // Fail before measuring, a ping run takes seconds
        self.store
            .lock()
            .await
            .project(&req.project)
            .map_err(convert::store_status)?;

        let sample = measure_sample(&self.scanner, &self.measure, x, y).await;
        let sample = self
            .store
            .lock()
            .await
            .add_sample(&req.project, sample)
            .map_err(convert::store_status)?;

        log::info!(
            "Sample {} at ({:.1}, {:.1}) in '{}'",
            sample.id,
            sample.x,
            sample.y,
            if req.project.is_empty() { "default" } else { req.project.as_str() }
        );

        Ok(Response::new(convert::sample(&sample)))
    }

    async fn reset_samples(&self, request: Request<ProjectRequest>) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();
        let removed = self
            .store
            .lock()
            .await
            .reset(&req.project)
            .map_err(convert::store_status)?;

        log::info!("Removed {} samples", removed);

        Ok(Response::new(Empty {}))
    }

    async fn get_heatmap(
        &self,
        request: Request<HeatmapRequest>,
    ) -> Result<Response<HeatmapResponse>, Status> {
        let req = request.into_inner();

        let metric = find_metric(&self.metrics, &req.metric)
            .cloned()
            .ok_or_else(|| Status::invalid_argument(format!("unknown metric '{}'", req.metric)))?;

        let (samples, plan_size) = {
            let store = self.store.lock().await;
            let project = store.project(&req.project).map_err(convert::store_status)?;
            (
                project.samples.clone(),
                project.floorplan.as_ref().map(|f| (f.width, f.height)),
            )
        };

        let width = req.width.or(plan_size.map(|(w, _)| w));
        let height = req.height.or(plan_size.map(|(_, h)| h));
        let (Some(width), Some(height)) = (width, height) else {
            return Err(Status::failed_precondition(
                "project has no floor plan, width and height are required",
            ));
        };

        let options = self.heat_field_options(&req);
        let grid_cells = (width / options.grid_step + 1.0) * (height / options.grid_step + 1.0);
        if grid_cells > MAX_HEATMAP_CELLS {
            return Err(Status::invalid_argument(format!(
                "surface {}x{} is too large",
                width, height
            )));
        }

        let surface = Surface::new(width, height);
        let field_metric = metric.clone();

        let field = tokio::task::spawn_blocking(move || {
            build_heat_field(surface, &samples, &field_metric, &options)
        })
        .await
        .map_err(|e| Status::internal(e.to_string()))?;

        Ok(Response::new(convert::heatmap(&field, &metric)))
    }

    async fn set_floorplan(
        &self,
        request: Request<SetFloorplanRequest>,
    ) -> Result<Response<Empty>, Status> {
        let req = request.into_inner();

        self.store
            .lock()
            .await
            .set_floorplan(&req.project, req.floorplan.map(convert::floorplan_record))
            .map_err(convert::store_status)?;

        Ok(Response::new(Empty {}))
    }

    async fn get_floorplan(
        &self,
        request: Request<ProjectRequest>,
    ) -> Result<Response<FloorplanResponse>, Status> {
        let req = request.into_inner();
        let store = self.store.lock().await;
        let project = store.project(&req.project).map_err(convert::store_status)?;

        Ok(Response::new(FloorplanResponse {
            floorplan: project.floorplan.as_ref().map(convert::floorplan),
        }))
    }
}

#[cfg(test)]
mod tests {
    use tonic::Code;

    use super::*;
    use crate::scanner::tests::FakeProvider;
    use wifimap_common::LinkInfo;
    use wifimap_core::default_catalog;

    fn service() -> SamplesService {
        let provider = FakeProvider {
            link: LinkInfo {
                ssid: Some("Office".into()),
                rssi_dbm: Some(-50.0),
                ..LinkInfo::default()
            },
            ..FakeProvider::default()
        };

        SamplesService::new(
            Arc::new(Mutex::new(ProjectStore::in_memory())),
            Arc::new(ScanService::new(Arc::new(provider), 45_000)),
            default_catalog(),
            MeasureConfig::default(),
            HeatmapConfig::default(),
        )
    }

    fn heatmap_request(metric: &str) -> HeatmapRequest {
        HeatmapRequest {
            project: String::new(),
            metric: metric.to_string(),
            width: Some(48.0),
            height: Some(48.0),
            band: String::new(),
            auto_scale: false,
            high_contrast: false,
        }
    }

    #[tokio::test]
    async fn test_add_sample_and_render() {
        let service = service();

        let sample = service
            .add_sample(Request::new(AddSampleRequest {
                project: String::new(),
                x: 24.0,
                y: 24.0,
            }))
            .await
            .expect("sample added")
            .into_inner();
        assert_eq!(sample.ssid.as_deref(), Some("Office"));

        let listed = service
            .list_samples(Request::new(ProjectRequest { project: "default".into() }))
            .await
            .expect("samples")
            .into_inner();
        assert_eq!(listed.samples.len(), 1);

        let heatmap = service
            .get_heatmap(Request::new(heatmap_request("rssi_dbm")))
            .await
            .expect("heatmap")
            .into_inner();

        assert_eq!(heatmap.step, 24.0);
        assert_eq!(heatmap.cells.len(), 9);
        assert!(heatmap.cells.iter().all(|c| (c.value + 50.0).abs() < 1e-9));
        assert_eq!(heatmap.metric.expect("metric").key, "rssi_dbm");
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let service = service();

        let status = service
            .add_sample(Request::new(AddSampleRequest {
                project: String::new(),
                x: f64::NAN,
                y: 1.0,
            }))
            .await
            .expect_err("nan position");
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = service
            .add_sample(Request::new(AddSampleRequest {
                project: "missing".into(),
                x: 1.0,
                y: 1.0,
            }))
            .await
            .expect_err("unknown project");
        assert_eq!(status.code(), Code::NotFound);

        let status = service
            .get_heatmap(Request::new(heatmap_request("throughput")))
            .await
            .expect_err("unknown metric");
        assert_eq!(status.code(), Code::InvalidArgument);

        let mut huge = heatmap_request("rssi_dbm");
        huge.width = Some(1.0e9);
        let status = service
            .get_heatmap(Request::new(huge))
            .await
            .expect_err("surface too large");
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_projects_and_reset() {
        let service = service();

        let project = service
            .create_project(Request::new(CreateProjectRequest { name: "Floor 2".into() }))
            .await
            .expect("project")
            .into_inner();
        assert_eq!(project.id, "floor-2");

        service
            .add_sample(Request::new(AddSampleRequest {
                project: "floor-2".into(),
                x: 0.0,
                y: 0.0,
            }))
            .await
            .expect("sample added");

        let projects = service
            .list_projects(Request::new(Empty {}))
            .await
            .expect("projects")
            .into_inner();
        assert_eq!(projects.projects.len(), 2);
        assert_eq!(projects.projects[1].sample_count, 1);

        service
            .reset_samples(Request::new(ProjectRequest { project: "floor-2".into() }))
            .await
            .expect("reset");

        let projects = service
            .list_projects(Request::new(Empty {}))
            .await
            .expect("projects")
            .into_inner();
        assert_eq!(projects.projects[1].sample_count, 0);
    }

    #[tokio::test]
    async fn test_floorplan_sets_heatmap_surface() {
        let service = service();

        service
            .add_sample(Request::new(AddSampleRequest {
                project: String::new(),
                x: 24.0,
                y: 24.0,
            }))
            .await
            .expect("sample added");

        let mut request = heatmap_request("rssi_dbm");
        request.width = None;
        request.height = None;

        let status = service
            .get_heatmap(Request::new(request.clone()))
            .await
            .expect_err("no surface");
        assert_eq!(status.code(), Code::FailedPrecondition);

        service
            .set_floorplan(Request::new(SetFloorplanRequest {
                project: String::new(),
                floorplan: Some(crate::grpc::wifimap::Floorplan {
                    image: vec![0x89, b'P', b'N', b'G'],
                    content_type: "image/png".into(),
                    width: 48.0,
                    height: 24.0,
                }),
            }))
            .await
            .expect("floor plan stored");

        let heatmap = service
            .get_heatmap(Request::new(request))
            .await
            .expect("heatmap")
            .into_inner();
        // 3 columns by 2 rows over the 48x24 floor plan
        assert_eq!(heatmap.cells.len(), 6);

        let floorplan = service
            .get_floorplan(Request::new(ProjectRequest { project: String::new() }))
            .await
            .expect("floor plan")
            .into_inner()
            .floorplan
            .expect("floor plan present");
        assert_eq!(floorplan.content_type, "image/png");
        assert_eq!(floorplan.width, 48.0);

        let projects = service
            .list_projects(Request::new(Empty {}))
            .await
            .expect("projects")
            .into_inner();
        assert!(projects.projects[0].has_floorplan);

        let status = service
            .set_floorplan(Request::new(SetFloorplanRequest {
                project: String::new(),
                floorplan: Some(crate::grpc::wifimap::Floorplan {
                    image: vec![1],
                    content_type: "image/png".into(),
                    width: -1.0,
                    height: 24.0,
                }),
            }))
            .await
            .expect_err("negative width");
        assert_eq!(status.code(), Code::InvalidArgument);

        service
            .set_floorplan(Request::new(SetFloorplanRequest {
                project: String::new(),
                floorplan: None,
            }))
            .await
            .expect("floor plan removed");
        let response = service
            .get_floorplan(Request::new(ProjectRequest { project: String::new() }))
            .await
            .expect("floor plan")
            .into_inner();
        assert!(response.floorplan.is_none());
    }
}
