use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        IdInput,
        products::{CreateProductRequest, MarkerList, ProductList, RateProductRequest, ReviewList},
        reups::{
            AddProductsRequest, AddUpdateRequest, CreateReUpRequest, RemoveProductRequest,
            ReUpList, ReplaceReUpRequest, UpdateReUpRequest,
        },
        tags::TagList,
    },
    entity::products::ProductType,
    models::{
        DeleteCount, Product, ProductMarker, ProductMarkerWithProduct, ProductReview,
        ProductReviewWithProduct, ProductTag, ProductWithTags, ReUp, ReUpDetail, ReUpProduct,
        ReUpProductEntry, ReUpUpdate, ReUpWithProducts,
    },
    response::{ApiResponse, ErrorMessage, JsonEnvelope, Meta, Status},
    routes::{health, reups, rpc},
    validation::SelectOption,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        rpc::call_procedure,
        rpc::query_procedure,
        reups::list_reups,
        reups::create_reup,
        reups::get_reup,
        reups::replace_reup,
        reups::patch_reup,
        reups::delete_reup
    ),
    components(
        schemas(
            ReUp,
            ReUpProduct,
            ReUpProductEntry,
            ReUpUpdate,
            ReUpWithProducts,
            ReUpDetail,
            Product,
            ProductType,
            ProductTag,
            ProductWithTags,
            ProductMarker,
            ProductMarkerWithProduct,
            ProductReview,
            ProductReviewWithProduct,
            DeleteCount,
            IdInput,
            SelectOption<i32>,
            SelectOption<String>,
            CreateReUpRequest,
            UpdateReUpRequest,
            ReplaceReUpRequest,
            AddProductsRequest,
            AddUpdateRequest,
            RemoveProductRequest,
            CreateProductRequest,
            RateProductRequest,
            ReUpList,
            ProductList,
            MarkerList,
            ReviewList,
            TagList,
            rpc::ProcedureValue,
            Meta,
            Status,
            ErrorMessage,
            ApiResponse<rpc::ProcedureValue>,
            JsonEnvelope<ReUpList>,
            JsonEnvelope<ReUpDetail>,
            JsonEnvelope<ErrorMessage>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Procedures", description = "Named `reups.*`, `products.*` and `tags.*` procedures"),
        (name = "ReUps", description = "REST endpoints for ReUps"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
