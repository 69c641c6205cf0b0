//! Catalog handlers: products, categories, brands.
//!
//! Thin on purpose: each operation maps request input onto the repository and the envelope.

use crate::db::Row;
use crate::error::AppError;
use crate::models::{self, PRODUCT_COLUMNS, PRODUCT_SORTS};
use crate::response;
use crate::routing::RequestContext;
use crate::service::{fields_from, FieldRule, RequestValidator};
use crate::sql::{Direction, Op, QueryBuf, SqlValue};
use crate::state::AppState;
use axum::response::Response;
use serde_json::{json, Map, Value};

const DEFAULT_PER_PAGE: u64 = 20;
const NUMERIC_COLUMNS: &[&str] = &["price", "rating", "stock", "category_id", "brand_id"];

fn is_truthy(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}

/// Query-string id or number: integer if it parses, text otherwise.
fn scalar(s: &str) -> SqlValue {
    s.parse::<i64>().map(SqlValue::Int).unwrap_or_else(|_| SqlValue::Text(s.to_string()))
}

fn price_param(ctx: &RequestContext, name: &str) -> Result<Option<f64>, AppError> {
    ctx.query_value(name)
        .map(|v| v.parse::<f64>().map_err(|_| AppError::BadRequest(format!("Invalid {}", name))))
        .transpose()
}

/// Numeric strings to numbers and `is_available` to a boolean, so both drivers see typed values.
fn coerce_product_body(body: &Map<String, Value>) -> Map<String, Value> {
    let mut out = body.clone();
    for col in NUMERIC_COLUMNS {
        if let Some(Value::String(s)) = out.get(*col) {
            let parsed = s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| s.trim().parse::<f64>().map(Value::from));
            if let Ok(v) = parsed {
                out.insert(col.to_string(), v);
            }
        }
    }
    if out.contains_key("is_available") {
        let flag = is_truthy(out.get("is_available"));
        out.insert("is_available".into(), Value::Bool(flag));
    }
    out
}

fn to_json<T: serde::Serialize>(v: T) -> Result<Value, AppError> {
    serde_json::to_value(v).map_err(|e| AppError::Internal(e.to_string()))
}

pub mod products {
    use super::*;

    const PRODUCT_RULES: &[(&str, FieldRule)] = &[
        ("name", FieldRule::required().max_length(255)),
        ("price", FieldRule::required().minimum(0.0)),
        ("stock", FieldRule::optional().minimum(0.0)),
        ("rating", FieldRule::optional().numeric()),
    ];

    const PRODUCT_UPDATE_RULES: &[(&str, FieldRule)] = &[
        ("name", FieldRule::optional().max_length(255)),
        ("price", FieldRule::optional().minimum(0.0)),
        ("stock", FieldRule::optional().minimum(0.0)),
        ("rating", FieldRule::optional().numeric()),
    ];

    /// GET /products: available products, filtered, sorted and paginated.
    pub async fn index(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let repo = state.repository(models::products(), ctx.version())?;
        let page = ctx.pagination(DEFAULT_PER_PAGE);

        let mut q = repo.query().filter("is_available", Op::Eq, true);
        if let Some(c) = ctx.query_value("category") {
            q = q.filter("category_id", Op::Eq, scalar(c));
        }
        if let Some(b) = ctx.query_value("brand") {
            q = q.filter("brand_id", Op::Eq, scalar(b));
        }
        if let Some(min) = price_param(&ctx, "min_price")? {
            q = q.filter("price", Op::Ge, min);
        }
        if let Some(max) = price_param(&ctx, "max_price")? {
            q = q.filter("price", Op::Le, max);
        }
        let sort = ctx
            .query_value("sort")
            .filter(|s| PRODUCT_SORTS.contains(s))
            .unwrap_or("created_at");
        let direction = ctx.query_value("order").map(Direction::parse).unwrap_or(Direction::Desc);
        q = q.order_by(sort, direction).order_by(repo.primary_key(), Direction::Asc);

        let result = q.paginate(page.per_page, page.offset).await?;
        Ok(response::ok(to_json(result)?))
    }

    /// GET /products/search?q=
    pub async fn search(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let term = ctx
            .query_value("q")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest("Search query is required".into()))?;
        let limit = ctx
            .query_value("limit")
            .and_then(|l| l.parse::<u64>().ok())
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, 100);

        let repo = state.repository(models::products(), ctx.version())?;
        let rows = repo
            .query()
            .filter("is_available", Op::Eq, true)
            .filter("name", Op::Like, format!("%{}%", term))
            .order_by("name", Direction::Asc)
            .limit(limit, None)
            .find_all()
            .await?;
        Ok(response::ok(json!({
            "data": rows,
            "count": rows.len(),
            "query": term,
        })))
    }

    /// GET /products/{id}
    pub async fn show(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let id = ctx.id_param("id")?;
        let repo = state.repository(models::products(), ctx.version())?;
        let product = repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
        if !is_truthy(product.get("is_available")) {
            return Err(AppError::NotFound("Product is not available".into()));
        }
        Ok(response::ok(json!({ "data": product })))
    }

    /// POST /products
    pub async fn create(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let body = coerce_product_body(ctx.body());
        RequestValidator::validate(&body, PRODUCT_RULES)?;
        let repo = state.repository(models::products(), ctx.version())?;

        let id = repo
            .create(fields_from(&body, PRODUCT_COLUMNS))
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create product".into()))?;
        let product: Option<Row> = repo.find(SqlValue::from(&id)).await?;
        Ok(response::created(json!({ "data": product }), "Product created successfully"))
    }

    /// POST|PUT /products/{id}
    pub async fn update(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let id = ctx.id_param("id")?;
        let body = coerce_product_body(ctx.body());
        RequestValidator::validate(&body, PRODUCT_UPDATE_RULES)?;
        let repo = state.repository(models::products(), ctx.version())?;
        if !repo.exists(id).await? {
            return Err(AppError::NotFound("Product not found".into()));
        }

        let fields = fields_from(&body, PRODUCT_COLUMNS);
        if fields.is_empty() {
            return Err(AppError::BadRequest("No fields to update".into()));
        }
        if !repo.update(id, fields).await? {
            return Err(AppError::Internal("Failed to update product".into()));
        }
        let product = repo.find(id).await?;
        Ok(response::success(
            json!({ "data": product }),
            Some("Product updated successfully"),
            axum::http::StatusCode::OK,
        ))
    }

    /// DELETE /products/{id}
    pub async fn delete(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let id = ctx.id_param("id")?;
        let repo = state.repository(models::products(), ctx.version())?;
        if !repo.exists(id).await? {
            return Err(AppError::NotFound("Product not found".into()));
        }
        if !repo.delete(id).await? {
            return Err(AppError::Internal("Failed to delete product".into()));
        }
        Ok(response::success(
            Value::Null,
            Some("Product deleted successfully"),
            axum::http::StatusCode::OK,
        ))
    }

    /// GET /categories/{id}/products
    pub async fn category_products(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let id = ctx.id_param("id")?;
        let categories = state.repository(models::categories(), ctx.version())?;
        let category = categories
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".into()))?;
        let listing = products_for(&state, &ctx, "category_id", id).await?;
        Ok(response::ok(json!({ "category": category, "products": listing })))
    }

    /// Paginated available products with `column = id`, newest first.
    pub(crate) async fn products_for(
        state: &AppState,
        ctx: &RequestContext,
        column: &str,
        id: i64,
    ) -> Result<Value, AppError> {
        let page = ctx.pagination(DEFAULT_PER_PAGE);
        let repo = state.repository(models::products(), ctx.version())?;
        let result = repo
            .query()
            .filter(column, Op::Eq, id)
            .filter("is_available", Op::Eq, true)
            .order_by("created_at", Direction::Desc)
            .order_by(repo.primary_key(), Direction::Asc)
            .paginate(page.per_page, page.offset)
            .await?;
        to_json(result)
    }
}

pub mod categories {
    use super::*;

    /// GET /categories, each with its count of available products.
    pub async fn index(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let repo = state.repository(models::categories(), ctx.version())?;
        let mut q = QueryBuf::new();
        let available = repo.bind(&mut q, true);
        q.sql = format!(
            "SELECT c.*, COUNT(p.id) AS product_count FROM categories c \
             LEFT JOIN products p ON p.category_id = c.id AND p.is_available = {} \
             GROUP BY c.id ORDER BY c.name ASC",
            available
        );
        let rows = repo.fetch_all(q).await?;
        Ok(response::ok(json!({ "data": rows })))
    }
}

pub mod brands {
    use super::*;

    /// GET /brands
    pub async fn index(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let repo = state.repository(models::brands(), ctx.version())?;
        let rows = repo.query().order_by("name", Direction::Asc).find_all().await?;
        Ok(response::ok(json!({ "data": rows })))
    }

    /// GET /brands/{id}/products
    pub async fn products(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        let id = ctx.id_param("id")?;
        let brands = state.repository(models::brands(), ctx.version())?;
        let brand = brands
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Brand not found".into()))?;
        let listing = super::products::products_for(&state, &ctx, "brand_id", id).await?;
        Ok(response::ok(json!({ "brand": brand, "products": listing })))
    }
}
