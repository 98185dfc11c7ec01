//! The fixed set of analytical queries, as parameterized definitions.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::staging::{dedup_relation_name, quote_ident, relation_name};
use crate::schema::Value;

/// Names of the conventional tables, as registered by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetNames {
    pub transactions: String,
    pub products: String,
    pub users: String,
}

impl Default for DatasetNames {
    fn default() -> Self {
        Self {
            transactions: "TRANSACTION_TAKEHOME".to_string(),
            products: "PRODUCTS_TAKEHOME".to_string(),
            users: "USER_TAKEHOME".to_string(),
        }
    }
}

/// Values bound into the query set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParams {
    /// Reference date for ages and account ages.
    pub as_of: NaiveDate,
    /// Minimum user age in whole years.
    pub min_age: u32,
    /// Minimum account age in days.
    pub min_account_days: u32,
    /// Rows returned by the ranking queries.
    pub limit: u32,
    /// Substring searched for in category labels.
    pub category_pattern: String,
    /// Category label for the leading-brand query.
    pub category_label: String,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            as_of: Utc::now().date_naive(),
            min_age: 21,
            min_account_days: 180,
            limit: 5,
            category_pattern: "Dip".to_string(),
            category_label: "Dips & Salsa".to_string(),
        }
    }
}

impl QueryParams {
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn with_min_age(mut self, years: u32) -> Self {
        self.min_age = years;
        self
    }

    pub fn with_min_account_days(mut self, days: u32) -> Self {
        self.min_account_days = days;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_category_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.category_pattern = pattern.into();
        self
    }

    pub fn with_category_label(mut self, label: impl Into<String>) -> Self {
        self.category_label = label.into();
        self
    }
}

/// A named parameter bound at execution time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParam {
    /// Placeholder including its prefix, e.g. `:as_of`.
    pub name: String,
    pub value: Value,
}

impl QueryParam {
    fn new(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// One read-only query against the staged relations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDefinition {
    pub name: String,
    pub description: String,
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Relation names the query set is written against.
struct Relations {
    transactions: String,
    receipts: String,
    products: String,
    users: String,
}

impl Relations {
    fn new(names: &DatasetNames) -> Self {
        Self {
            transactions: quote_ident(&relation_name(&names.transactions)),
            receipts: quote_ident(&dedup_relation_name(&names.transactions)),
            products: quote_ident(&relation_name(&names.products)),
            users: quote_ident(&relation_name(&names.users)),
        }
    }
}

fn as_of(params: &QueryParams) -> QueryParam {
    QueryParam::new(":as_of", Value::Text(params.as_of.format("%Y-%m-%d").to_string()))
}

fn limit(params: &QueryParams) -> QueryParam {
    QueryParam::new(":limit", Value::Integer(i64::from(params.limit)))
}

impl QueryDefinition {
    /// Top brands by distinct receipts among users at or above a minimum age.
    pub fn top_brands_by_receipts(names: &DatasetNames, params: &QueryParams) -> Self {
        let r = Relations::new(names);
        let sql = format!(
            r#"WITH brands AS (
    SELECT "BARCODE" AS barcode, MAX("BRAND") AS brand
    FROM {products}
    WHERE "BARCODE" IS NOT NULL
    GROUP BY "BARCODE"
)
SELECT
    b.brand AS brand
    , COUNT(DISTINCT t."RECEIPT_ID") AS receipt_count
FROM {transactions} t
JOIN {users} u
    ON t."USER_ID" = u."ID"
JOIN brands b
    ON t."BARCODE" = b.barcode
WHERE date(u."BIRTH_DATE", '+' || :min_age || ' years') <= date(:as_of)
    AND b.brand IS NOT NULL
GROUP BY b.brand
ORDER BY receipt_count DESC, brand ASC
LIMIT :limit"#,
            products = r.products,
            transactions = r.transactions,
            users = r.users,
        );

        Self {
            name: "top_brands_by_receipts".to_string(),
            description: format!(
                "Top {} brands by receipts scanned among users {} and over",
                params.limit, params.min_age
            ),
            sql,
            params: vec![
                QueryParam::new(":min_age", Value::Integer(i64::from(params.min_age))),
                as_of(params),
                limit(params),
            ],
        }
    }

    /// Top brands by sales among users whose account has a minimum age.
    pub fn top_brands_by_sales(names: &DatasetNames, params: &QueryParams) -> Self {
        let r = Relations::new(names);
        let sql = format!(
            r#"WITH brands AS (
    SELECT "BARCODE" AS barcode, MAX("BRAND") AS brand
    FROM {products}
    WHERE "BARCODE" IS NOT NULL
    GROUP BY "BARCODE"
)
SELECT
    b.brand AS brand
    , ROUND(SUM(d."FINAL_SALE"), 2) AS total_sales
FROM {receipts} d
JOIN {users} u
    ON d."USER_ID" = u."ID"
JOIN brands b
    ON d."BARCODE" = b.barcode
WHERE date(u."CREATED_DATE") <= date(:as_of, '-' || :min_account_days || ' days')
    AND b.brand IS NOT NULL
GROUP BY b.brand
HAVING total_sales IS NOT NULL
ORDER BY total_sales DESC, brand ASC
LIMIT :limit"#,
            products = r.products,
            receipts = r.receipts,
            users = r.users,
        );

        Self {
            name: "top_brands_by_sales".to_string(),
            description: format!(
                "Top {} brands by sales among users with accounts at least {} days old",
                params.limit, params.min_account_days
            ),
            sql,
            params: vec![
                as_of(params),
                QueryParam::new(
                    ":min_account_days",
                    Value::Integer(i64::from(params.min_account_days)),
                ),
                limit(params),
            ],
        }
    }

    /// Category labels containing a substring, across all three levels.
    pub fn category_lookup(names: &DatasetNames, params: &QueryParams) -> Self {
        let r = Relations::new(names);
        let sql = format!(
            r#"SELECT DISTINCT category
FROM (
    SELECT "CATEGORY_1" AS category FROM {products}
    UNION ALL
    SELECT "CATEGORY_2" FROM {products}
    UNION ALL
    SELECT "CATEGORY_3" FROM {products}
)
WHERE category LIKE '%' || :pattern || '%'
ORDER BY category"#,
            products = r.products,
        );

        Self {
            name: "category_lookup".to_string(),
            description: format!("Category labels matching '{}'", params.category_pattern),
            sql,
            params: vec![QueryParam::new(
                ":pattern",
                Value::Text(params.category_pattern.clone()),
            )],
        }
    }

    /// Brand(s) tied for the most receipts within one category.
    pub fn leading_brand_in_category(names: &DatasetNames, params: &QueryParams) -> Self {
        let r = Relations::new(names);
        let sql = format!(
            r#"WITH brands AS (
    SELECT "BARCODE" AS barcode, MAX("BRAND") AS brand
    FROM {products}
    WHERE "BARCODE" IS NOT NULL
        AND "CATEGORY_2" = :category
    GROUP BY "BARCODE"
),
ranked AS (
    SELECT
        b.brand AS brand
        , COUNT(DISTINCT d."RECEIPT_ID") AS receipt_count
        , ROUND(SUM(d."FINAL_SALE"), 2) AS total_sales
    FROM {receipts} d
    JOIN brands b
        ON d."BARCODE" = b.barcode
    WHERE b.brand IS NOT NULL
    GROUP BY b.brand
)
SELECT brand, receipt_count, total_sales
FROM ranked
WHERE receipt_count = (SELECT MAX(receipt_count) FROM ranked)
ORDER BY brand ASC"#,
            products = r.products,
            receipts = r.receipts,
        );

        Self {
            name: "leading_brand_in_category".to_string(),
            description: format!("Leading brand in '{}' by receipts", params.category_label),
            sql,
            params: vec![QueryParam::new(
                ":category",
                Value::Text(params.category_label.clone()),
            )],
        }
    }

    /// Transaction lines whose identifying columns repeat.
    pub fn duplicate_receipt_lines(names: &DatasetNames, params: &QueryParams) -> Self {
        let r = Relations::new(names);
        let sql = format!(
            r#"SELECT
    "RECEIPT_ID" AS receipt_id
    , "BARCODE" AS barcode
    , "USER_ID" AS user_id
    , COUNT(*) AS line_count
FROM {transactions}
GROUP BY "RECEIPT_ID", "BARCODE", "USER_ID"
HAVING COUNT(*) > 1
ORDER BY line_count DESC, receipt_id ASC, barcode ASC
LIMIT :limit"#,
            transactions = r.transactions,
        );

        Self {
            name: "duplicate_receipt_lines".to_string(),
            description: "Receipt lines scanned more than once".to_string(),
            sql,
            params: vec![limit(params)],
        }
    }
}

/// The full query set, in execution order.
pub fn standard_queries(names: &DatasetNames, params: &QueryParams) -> Vec<QueryDefinition> {
    vec![
        QueryDefinition::top_brands_by_receipts(names, params),
        QueryDefinition::top_brands_by_sales(names, params),
        QueryDefinition::category_lookup(names, params),
        QueryDefinition::leading_brand_in_category(names, params),
        QueryDefinition::duplicate_receipt_lines(names, params),
    ]
}
