//! 種子搜尋 gRPC 伺服器
//!
//! 對外提供五個 RPC：Validate（只驗證過濾器）、StartSearch
//! （建立工作）、StreamResults（串流命中）、Status（進度）、
//! Cancel（合作式取消）。搜尋本體在 library 的 `search` 模組。

use std::env;
use std::pin::Pin;
use std::sync::atomic::Ordering;

use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tonic::{Request, Response, Status};

use seed_seeker::proto::seed_seeker_server::{SeedSeeker, SeedSeekerServer};
use seed_seeker::proto::{
    CancelReply, SearchHandle, SearchRequest, SearchResult, SearchStatus, ValidateReply,
    ValidateRequest,
};
use seed_seeker::search::config;
use seed_seeker::search::score::CutoffConfig;
use seed_seeker::service::{JobRegistry, SearchPlan};

#[derive(Default)]
struct SeekerService {
    jobs: JobRegistry,
}

#[tonic::async_trait]
impl SeedSeeker for SeekerService {
    async fn validate(
        &self,
        request: Request<ValidateRequest>,
    ) -> Result<Response<ValidateReply>, Status> {
        let reply = match config::prepare_str(&request.into_inner().filter_json) {
            Ok(_) => ValidateReply {
                ok: true,
                error: String::new(),
            },
            Err(e) => ValidateReply {
                ok: false,
                error: e.to_string(),
            },
        };
        Ok(Response::new(reply))
    }

    async fn start_search(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<SearchHandle>, Status> {
        let req = request.into_inner();
        let filter = config::prepare_str(&req.filter_json)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;

        let plan = if req.random_order {
            if req.count == 0 {
                return Err(Status::invalid_argument(
                    "random_order requires a non-zero count",
                ));
            }
            SearchPlan::Random { count: req.count }
        } else {
            SearchPlan::Range {
                start: req.start_index,
                count: req.count,
            }
        };
        let cutoff = CutoffConfig {
            base: req.cutoff,
            adaptive: req.adaptive_cutoff,
        };

        let job_id = self.jobs.start(filter, plan, cutoff);
        Ok(Response::new(SearchHandle { job_id }))
    }

    type StreamResultsStream =
        Pin<Box<dyn tokio_stream::Stream<Item = Result<SearchResult, Status>> + Send>>;

    async fn stream_results(
        &self,
        request: Request<SearchHandle>,
    ) -> Result<Response<Self::StreamResultsStream>, Status> {
        let job_id = request.into_inner().job_id;
        let job = self
            .jobs
            .get(job_id)
            .ok_or_else(|| Status::not_found(format!("job {} not found", job_id)))?;
        let rx = job
            .take_receiver()
            .ok_or_else(|| Status::failed_precondition("results already streamed"))?;

        let stream = ReceiverStream::new(rx).map(|found| {
            Ok(SearchResult {
                seed: found.seed,
                score: found.score,
                tallies: found.tallies,
            })
        });
        Ok(Response::new(Box::pin(stream)))
    }

    async fn status(
        &self,
        request: Request<SearchHandle>,
    ) -> Result<Response<SearchStatus>, Status> {
        let job_id = request.into_inner().job_id;
        let job = self
            .jobs
            .get(job_id)
            .ok_or_else(|| Status::not_found(format!("job {} not found", job_id)))?;
        Ok(Response::new(SearchStatus {
            scanned: job.progress.scanned.load(Ordering::Relaxed),
            found: job.progress.found.load(Ordering::Relaxed),
            done: job.done.load(Ordering::Relaxed),
            cancelled: job.cancel.load(Ordering::Relaxed),
        }))
    }

    async fn cancel(
        &self,
        request: Request<SearchHandle>,
    ) -> Result<Response<CancelReply>, Status> {
        let job_id = request.into_inner().job_id;
        Ok(Response::new(CancelReply {
            cancelled: self.jobs.cancel(job_id),
        }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // PORT 環境變數為預設，--port 參數覆蓋
    let mut port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(50051);

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1].parse().unwrap_or(port);
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let addr = format!("0.0.0.0:{}", port).parse()?;
    let service = SeekerService::default();

    println!("SeedSeeker gRPC server listening on {}", addr);

    tonic::transport::Server::builder()
        .add_service(SeedSeekerServer::new(service))
        .serve(addr)
        .await?;

    Ok(())
}
