//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers;

/// Generated OpenAPI description, served under `/api-docs/openapi.json`
/// when the `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "flashpool-gateway",
        description = "Flash-loan settlement engine: fund pools, execute atomic flash loans, replay committed events."
    ),
    paths(
        handlers::pool::fund_pool,
        handlers::pool::list_pools,
        handlers::pool::get_pool,
        handlers::flash_loan::execute_flash_loan,
        handlers::flash_loan::flash_fee,
        handlers::events::list_events,
        handlers::system::health_handler,
        handlers::system::borrowers_handler,
    ),
    tags(
        (name = "Pools", description = "Per-asset liquidity pools"),
        (name = "Flash Loans", description = "Atomic borrow and repay"),
        (name = "Events", description = "Committed funding and loan events"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;
