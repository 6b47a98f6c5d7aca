//! The GraphQL type graph and its root query fields.
//!
//! ```graphql
//! type Country {
//!   code: ID!
//!   name: String
//!   native: String
//!   phone: String
//!   continent: Continent
//!   capital: String
//!   currency: String
//!   languages: [Language]
//!   emoji: String!
//! }
//!
//! type Language {
//!   name: String
//!   native: String
//! }
//!
//! type Continent {
//!   code: ID!
//!   name: String
//!   countries: [Country!]!
//! }
//!
//! type Query {
//!   countries(filter: JSON): [Country]
//!   country(code: ID!): Country
//!   continent(name: String!): Continent
//!   languages: [Language]
//!   language(code: ID): Language
//! }
//! ```
use std::sync::Arc;

use async_graphql::Context;
use async_graphql::EmptyMutation;
use async_graphql::EmptySubscription;
use async_graphql::Json;
use async_graphql::Object;
use async_graphql::Result;
use async_graphql::ID;

use crate::configuration::Configuration;
use crate::dataset::Dataset;
use crate::resolvers;
use crate::resolvers::ContinentNode;
use crate::resolvers::CountryNode;
use crate::resolvers::LanguageNode;

pub type CountriesSchema = async_graphql::Schema<Query, EmptyMutation, EmptySubscription>;

/// Build the executable schema, serving `dataset`.
pub fn build_schema(dataset: Arc<Dataset>, configuration: &Configuration) -> CountriesSchema {
    let mut builder =
        async_graphql::Schema::build(Query, EmptyMutation, EmptySubscription).data(dataset);
    if let Some(depth) = configuration.limits.max_depth {
        builder = builder.limit_depth(depth);
    }
    if let Some(complexity) = configuration.limits.max_complexity {
        builder = builder.limit_complexity(complexity);
    }
    if !configuration.server.introspection {
        builder = builder.disable_introspection();
    }
    builder.finish()
}

/// The schema definition, as served to clients.
pub fn sdl() -> String {
    build_schema(Arc::default(), &Configuration::default()).sdl()
}

fn dataset<'ctx>(ctx: &Context<'ctx>) -> Result<&'ctx Arc<Dataset>> {
    ctx.data::<Arc<Dataset>>()
}

pub struct Query;

#[Object]
impl Query {
    /// All countries. `filter` is accepted for compatibility and ignored.
    async fn countries(
        &self,
        ctx: &Context<'_>,
        filter: Option<Json<serde_json::Value>>,
    ) -> Result<Option<Vec<Option<CountryNode>>>> {
        if let Some(Json(filter)) = filter {
            tracing::debug!(%filter, "ignoring countries filter");
        }
        let countries = resolvers::countries(dataset(ctx)?);
        Ok(Some(countries.into_iter().map(Some).collect()))
    }

    async fn country(&self, ctx: &Context<'_>, code: ID) -> Result<Option<CountryNode>> {
        Ok(resolvers::country(dataset(ctx)?, &code))
    }

    /// The continent whose code is `name`.
    // The argument is historically named `name` but holds a continent code.
    async fn continent(&self, ctx: &Context<'_>, name: String) -> Result<Option<ContinentNode>> {
        Ok(Some(resolvers::continent(dataset(ctx)?, &name)))
    }

    async fn languages(&self, ctx: &Context<'_>) -> Result<Option<Vec<Option<LanguageNode>>>> {
        let languages = resolvers::languages(dataset(ctx)?);
        Ok(Some(languages.into_iter().map(Some).collect()))
    }

    async fn language(&self, ctx: &Context<'_>, code: Option<ID>) -> Result<Option<LanguageNode>> {
        let Some(code) = code else {
            return Ok(None);
        };
        Ok(resolvers::language(dataset(ctx)?, &code))
    }
}

#[Object(name = "Country")]
impl CountryNode {
    async fn code(&self) -> ID {
        ID(self.code.clone())
    }

    async fn name(&self) -> Option<&str> {
        self.record.name.as_deref()
    }

    async fn native(&self) -> Option<&str> {
        self.record.native.as_deref()
    }

    async fn phone(&self) -> Option<&str> {
        self.record.phone.as_deref()
    }

    async fn continent(&self, ctx: &Context<'_>) -> Result<Option<ContinentNode>> {
        Ok(Some(resolvers::country_continent(dataset(ctx)?, self)))
    }

    async fn capital(&self) -> Option<&str> {
        self.record.capital.as_deref()
    }

    async fn currency(&self) -> Option<&str> {
        self.record.currency.as_deref()
    }

    async fn languages(&self, ctx: &Context<'_>) -> Result<Option<Vec<Option<LanguageNode>>>> {
        let languages = resolvers::country_languages(dataset(ctx)?, self);
        Ok(Some(languages.into_iter().map(Some).collect()))
    }

    async fn emoji(&self) -> &str {
        &self.record.emoji
    }
}

#[Object(name = "Language")]
impl LanguageNode {
    async fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn native(&self) -> Option<&str> {
        self.native.as_deref()
    }
}

#[Object(name = "Continent")]
impl ContinentNode {
    async fn code(&self) -> ID {
        ID(self.code.clone())
    }

    async fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn countries(&self, ctx: &Context<'_>) -> Result<Vec<CountryNode>> {
        Ok(resolvers::continent_countries(dataset(ctx)?, self))
    }
}
