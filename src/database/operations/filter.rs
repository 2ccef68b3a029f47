// 动态拼 WHERE 条件，占位符统一用 $n，sqlite 和 postgres 都认

use sqlx::AnyPool;

use crate::common::BoundingBox;
use crate::database::models::MapRecord;

enum Bind {
    Float(f64),
    Int(i64),
}

#[derive(Default)]
pub(super) struct Filter {
    clauses: Vec<String>,
    binds: Vec<Bind>,
}

impl Filter {
    pub(super) fn new() -> Self {
        Self::default()
    }

    fn placeholder(&mut self, bind: Bind) -> String {
        self.binds.push(bind);
        format!("${}", self.binds.len())
    }

    pub(super) fn int(&mut self, column: &str, op: &str, value: i64) -> &mut Self {
        let p = self.placeholder(Bind::Int(value));
        self.clauses.push(format!("{} {} {}", column, op, p));
        self
    }

    /// 没有范围时不加任何条件
    pub(super) fn bounding_box(&mut self, bbox: Option<&BoundingBox>) -> &mut Self {
        if let Some(bbox) = bbox {
            let sw_lat = self.placeholder(Bind::Float(bbox.sw.latitude));
            let sw_lng = self.placeholder(Bind::Float(bbox.sw.longitude));
            let ne_lat = self.placeholder(Bind::Float(bbox.ne.latitude));
            let ne_lng = self.placeholder(Bind::Float(bbox.ne.longitude));
            self.clauses.push(format!(
                "latitude >= {} AND longitude >= {} AND latitude <= {} AND longitude <= {}",
                sw_lat, sw_lng, ne_lat, ne_lng
            ));
        }
        self
    }

    /// values 不能为空
    pub(super) fn any_of(&mut self, column: &str, values: &[i64]) -> &mut Self {
        let placeholders: Vec<String> = values
            .iter()
            .map(|v| self.placeholder(Bind::Int(*v)))
            .collect();
        self.clauses
            .push(format!("{} IN ({})", column, placeholders.join(", ")));
        self
    }

    fn select_sql(&self, table: &str, columns: &[&str]) -> String {
        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), table);
        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }
        sql
    }

    pub(super) async fn fetch<R: MapRecord>(self, pool: &AnyPool) -> Result<Vec<R>, sqlx::Error> {
        let sql = self.select_sql(R::TABLE, R::COLUMNS);
        tracing::trace!("{}", sql);

        let mut query = sqlx::query_as::<_, R>(&sql);
        for bind in self.binds {
            query = match bind {
                Bind::Float(v) => query.bind(v),
                Bind::Int(v) => query.bind(v),
            };
        }
        query.fetch_all(pool).await
    }
}
