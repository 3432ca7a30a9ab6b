use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health,
        api::generate,
    ),
    tags(
        (name = "hallticket", description = "Hall-ticket PDF generation API")
    )
)]
pub struct ApiDoc;
