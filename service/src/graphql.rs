//! Read-only GraphQL view of the catalog.

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::Extension;
use axum::response::{Html, IntoResponse};
use rc_catalog::Resource;

use crate::build_info::{BuildInfo, BuildInfoProvider};
use crate::search::SearchController;

pub type ApiSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// A catalog record.
#[derive(SimpleObject)]
pub struct ResourceNode {
    pub id: u32,
    /// Display label, e.g. "Food Assistance"
    pub category: String,
    /// Short key: housing, food, or utility
    pub category_slug: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub website: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl From<&Resource> for ResourceNode {
    fn from(r: &Resource) -> Self {
        Self {
            id: r.id,
            category: r.category.label().to_string(),
            category_slug: r.category.slug().to_string(),
            name: r.name.clone(),
            description: r.description.clone(),
            address: r.address.clone(),
            phone: r.phone.clone(),
            website: r.website.clone(),
            lat: r.lat,
            lng: r.lng,
        }
    }
}

/// Zipcode search split by category.
#[derive(SimpleObject)]
pub struct SearchResultsNode {
    pub zipcode: String,
    pub housing: Vec<ResourceNode>,
    pub food: Vec<ResourceNode>,
    pub utility: Vec<ResourceNode>,
    pub total: usize,
}

fn nodes(resources: &[Resource]) -> Vec<ResourceNode> {
    resources.iter().map(ResourceNode::from).collect()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Resources for a zipcode. Unknown zipcodes give empty lists.
    async fn search(
        &self,
        ctx: &Context<'_>,
        zipcode: String,
    ) -> async_graphql::Result<SearchResultsNode> {
        let controller = ctx.data::<SearchController>()?;
        let results = controller.search(&zipcode);
        Ok(SearchResultsNode {
            total: results.len(),
            housing: nodes(&results.housing),
            food: nodes(&results.food),
            utility: nodes(&results.utility),
            zipcode,
        })
    }

    async fn resource(
        &self,
        ctx: &Context<'_>,
        id: u32,
    ) -> async_graphql::Result<Option<ResourceNode>> {
        let controller = ctx.data::<SearchController>()?;
        Ok(controller.catalog().get(id).map(ResourceNode::from))
    }

    /// Every zipcode with at least one resource, sorted.
    async fn zipcodes(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<String>> {
        let controller = ctx.data::<SearchController>()?;
        Ok(controller
            .catalog()
            .zipcodes()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    async fn build_info(&self, ctx: &Context<'_>) -> async_graphql::Result<BuildInfo> {
        Ok(ctx.data::<BuildInfoProvider>()?.build_info())
    }
}

/// Build the schema with the data its resolvers read.
#[must_use]
pub fn build_schema(controller: SearchController, build_info: BuildInfoProvider) -> ApiSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(controller)
        .data(build_info)
        .finish()
}

#[allow(clippy::unused_async)]
pub async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

pub async fn graphql_handler(
    schema: Extension<ApiSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}
