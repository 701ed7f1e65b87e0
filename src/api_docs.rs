use crate::api;
use crate::domain::BusinessModule;
use crate::registry::{EntryDescriptor, EntryKind, FieldSpec, FieldType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::registry::list_entries,
        api::registry::list_kind,
        api::registry::describe_entry,
        api::registry::invoke_entry,
        api::registry::invoke_batch,
    ),
    components(schemas(EntryDescriptor, EntryKind, FieldSpec, FieldType, BusinessModule)),
    tags(
        (name = "azals", description = "AZALS business registry API")
    )
)]
pub struct ApiDoc;
