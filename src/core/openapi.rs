use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::contact::{dtos as contact_dtos, handlers as contact_handlers};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::gallery::{dtos as gallery_dtos, handlers as gallery_handlers};
use crate::features::properties::{
    dtos as properties_dtos, handlers as properties_handlers, models as properties_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::get_me,
        // Public listing
        properties_handlers::public_handler::list_listings,
        properties_handlers::public_handler::get_listing,
        properties_handlers::public_handler::get_listing_fiche,
        // Properties
        properties_handlers::property_handler::list_properties,
        properties_handlers::property_handler::get_property,
        properties_handlers::property_handler::search_properties,
        properties_handlers::property_handler::filter_properties,
        properties_handlers::property_handler::list_active_properties,
        properties_handlers::property_handler::create_property,
        properties_handlers::property_handler::replace_property,
        properties_handlers::property_handler::patch_property,
        properties_handlers::property_handler::delete_property,
        // Gallery
        gallery_handlers::upload_image,
        gallery_handlers::list_images,
        gallery_handlers::get_image,
        gallery_handlers::delete_image,
        gallery_handlers::attach_image,
        gallery_handlers::delete_property_image,
        // Contact
        contact_handlers::submit_contact,
        // Dashboard
        dashboard_handlers::dashboard_handler::get_dashboard,
        dashboard_handlers::dashboard_handler::get_sales_report,
        // Admin
        admin_handlers::list_properties,
        admin_handlers::bulk_delete_properties,
        admin_handlers::mark_properties_sold,
        admin_handlers::bulk_delete_gallery_images,
        admin_handlers::bulk_delete_property_images,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::LoginRequestDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::AuthUserDto,
            auth::dtos::MeResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::MeResponseDto>,
            // Properties
            properties_models::PropertyStatus,
            properties_dtos::CreatePropertyDto,
            properties_dtos::UpdatePropertyDto,
            properties_dtos::PropertyDto,
            properties_dtos::LatestMovementDto,
            properties_dtos::ListingPageDto,
            properties_dtos::PropertyFicheDto,
            properties_dtos::ListingQuery,
            ApiResponse<properties_dtos::PropertyDto>,
            ApiResponse<Vec<properties_dtos::PropertyDto>>,
            ApiResponse<properties_dtos::ListingPageDto>,
            ApiResponse<properties_dtos::PropertyFicheDto>,
            // Gallery
            gallery_dtos::UploadGalleryImageDto,
            gallery_dtos::GalleryImageDto,
            gallery_dtos::GalleryImageDetailDto,
            gallery_dtos::PropertyImageDto,
            gallery_dtos::AttachImageDto,
            gallery_dtos::PropertyImageLinkDto,
            ApiResponse<gallery_dtos::GalleryImageDto>,
            ApiResponse<Vec<gallery_dtos::GalleryImageDto>>,
            ApiResponse<gallery_dtos::GalleryImageDetailDto>,
            ApiResponse<gallery_dtos::PropertyImageLinkDto>,
            // Contact
            contact_dtos::ContactRequestDto,
            // Dashboard
            dashboard_dtos::PriceBucket,
            dashboard_dtos::StatusCountDto,
            dashboard_dtos::PriceBucketCountDto,
            dashboard_dtos::DashboardDto,
            dashboard_dtos::SalesReportItemDto,
            dashboard_dtos::SalesReportSectionDto,
            dashboard_dtos::SalesReportDto,
            ApiResponse<dashboard_dtos::DashboardDto>,
            ApiResponse<dashboard_dtos::SalesReportDto>,
            // Admin
            admin_dtos::SortDirection,
            admin_dtos::AdminPropertyDto,
            admin_dtos::BulkIdsDto,
            admin_dtos::BulkActionResultDto,
            ApiResponse<Vec<admin_dtos::AdminPropertyDto>>,
            ApiResponse<admin_dtos::BulkActionResultDto>,
        )
    ),
    tags(
        (name = "auth", description = "Back-office login"),
        (name = "listings", description = "Public property listing and technical sheets"),
        (name = "properties", description = "Property catalogue; reads are public, writes need a token"),
        (name = "gallery", description = "Central image gallery and property images (admin only)"),
        (name = "contact", description = "Public contact form"),
        (name = "Dashboard", description = "Back-office counters and sales report"),
        (name = "admin", description = "Bulk back-office actions (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Multicasa API",
        version = "0.1.0",
        description = "API documentation for Multicasa",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
