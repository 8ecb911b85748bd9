use utoipa::OpenApi;

use crate::api::like_day::LikeDayRequest;
use crate::domain::{
    FeatureKey, FeatureSpec, Market, MatchResult, Metric, PriceComponent, ProfileRow,
};
use crate::pipeline::LikeDayOutput;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::like_day::like_day,
        crate::api::health::health,
    ),
    components(
        schemas(
            LikeDayRequest,
            LikeDayOutput,
            MatchResult,
            ProfileRow,
            FeatureSpec,
            FeatureKey,
            Market,
            PriceComponent,
            Metric,
        )
    ),
    tags((name = "pjm-like-day", description = "PJM like-day finder API v1"))
)]
pub struct ApiDoc;
