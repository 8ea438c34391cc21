use std::sync::Arc;

use tonic::{Request, Response, Status};
use wifimap_core::compute_congestion;

use super::convert;
use super::wifimap::{
    survey_server::Survey, ChannelsResponse, Empty, MetaResponse, ScanRequest, ScanResponse,
};
use crate::scanner::ScanService;

pub struct SurveyService {
    scanner: Arc<ScanService>,
    mode: String,
}

impl SurveyService {
    pub fn new(scanner: Arc<ScanService>, mode: &str) -> Self {
        Self {
            scanner,
            mode: mode.to_string(),
        }
    }
}

#[tonic::async_trait]
impl Survey for SurveyService {
    async fn get_meta(&self, _request: Request<Empty>) -> Result<Response<MetaResponse>, Status> {
        let link = self.scanner.link_info().await;

        Ok(Response::new(convert::meta(
            &link,
            &self.mode,
            self.scanner.provider_name(),
        )))
    }

    async fn scan(&self, request: Request<ScanRequest>) -> Result<Response<ScanResponse>, Status> {
        let req = request.into_inner();
        let snapshot = self.scanner.scan(req.force).await;

        Ok(Response::new(convert::scan(&snapshot)))
    }

    async fn get_channels(
        &self,
        request: Request<ScanRequest>,
    ) -> Result<Response<ChannelsResponse>, Status> {
        let req = request.into_inner();
        let snapshot = self.scanner.scan(req.force).await;
        let report = compute_congestion(&snapshot.result.networks);

        Ok(Response::new(ChannelsResponse {
            t: snapshot.result.t,
            source: snapshot.result.source.to_string(),
            cache_hit: snapshot.cache_hit,
            band24: Some(convert::band_report(&report.band24)),
            band5: Some(convert::band_report(&report.band5)),
        }))
    }
}
