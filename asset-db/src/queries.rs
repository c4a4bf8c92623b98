//! Read queries spanning several tables.
//!
//! Provides the product dependency graph, unresolved dependency matching,
//! combined scan folder/source/job/product rows, and table statistics.

use std::ops::ControlFlow;

use asset_db_types::{
    CombinedEntry, LikeType, ProductDependencyEntry, ProductEntry, like_search_term,
};
use rusqlite::named_params;
use uuid::Uuid;

use crate::AssetDatabaseConnection;
use crate::exec::{Db, Params};
use crate::filter::{JOB_FILTER_SQL, ProductFilter};
use crate::operations::OperationError;
use crate::rows::{combined_from_row, legacy_sub_id_from_row, product_dependency_from_row, product_from_row};

const UNRESOLVED_SEARCH_TABLE: &str = "QueryProductDependenciesUnresolvedAdvanced";

// ── Product Dependency Graph ────────────────────────────────────────────────

impl AssetDatabaseConnection {
    /// Products that `product_id` depends on directly.
    pub fn get_direct_product_dependencies(
        &self,
        product_id: i64,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT DISTINCT Products.* FROM Products
             INNER JOIN Jobs ON Jobs.JobID = Products.JobPK
             INNER JOIN Sources ON Sources.SourceID = Jobs.SourcePK
             INNER JOIN ProductDependencies
                 ON Sources.SourceGuid = ProductDependencies.DependencySourceGuid
                 AND Products.SubID = ProductDependencies.DependencySubID
             WHERE ProductDependencies.ProductPK = :productid
             ORDER BY Products.ProductID;",
            named_params! { ":productid": product_id },
            |row| product_from_row(row, 0),
        )?)
    }

    /// Products that directly depend on the product identified by a source
    /// guid and sub id.
    pub fn get_direct_reverse_product_dependencies_by_source_guid_sub_id(
        &self,
        source_guid: Uuid,
        sub_id: u32,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT DISTINCT Products.* FROM Products
             INNER JOIN ProductDependencies ON ProductDependencies.ProductPK = Products.ProductID
             WHERE ProductDependencies.DependencySourceGuid = :dependencysourceguid
                 AND ProductDependencies.DependencySubID = :dependencysubid
             ORDER BY Products.ProductID;",
            named_params! { ":dependencysourceguid": source_guid, ":dependencysubid": sub_id },
            |row| product_from_row(row, 0),
        )?)
    }

    /// Every product reachable from `product_id` through dependencies,
    /// excluding `product_id` itself. Cycles are tolerated.
    pub fn get_all_product_dependencies(
        &self,
        product_id: i64,
    ) -> Result<Vec<ProductEntry>, OperationError> {
        Ok(self.db().query_vec(
            "WITH RECURSIVE AllProductDeps(ProductID) AS (
                 SELECT :productid
                 UNION
                 SELECT Products.ProductID FROM Products
                 INNER JOIN Jobs ON Jobs.JobID = Products.JobPK
                 INNER JOIN Sources ON Sources.SourceID = Jobs.SourcePK
                 INNER JOIN ProductDependencies
                     ON Sources.SourceGuid = ProductDependencies.DependencySourceGuid
                     AND Products.SubID = ProductDependencies.DependencySubID
                 INNER JOIN AllProductDeps
                     ON ProductDependencies.ProductPK = AllProductDeps.ProductID
             )
             SELECT Products.* FROM Products
             INNER JOIN AllProductDeps ON AllProductDeps.ProductID = Products.ProductID
             WHERE Products.ProductID != :productid
             ORDER BY Products.ProductID;",
            named_params! { ":productid": product_id },
            |row| product_from_row(row, 0),
        )?)
    }

    /// Dependencies that are only known by path.
    pub fn get_unresolved_product_dependencies(
        &self,
    ) -> Result<Vec<ProductDependencyEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT * FROM ProductDependencies WHERE UnresolvedPath != ''
             ORDER BY ProductDependencyID;",
            &[],
            product_dependency_from_row,
        )?)
    }

    /// Match search paths against unresolved dependency paths.
    ///
    /// Stored paths may contain `*` wildcards. `visit` receives each matching
    /// dependency with the search path it matched, in search path order.
    pub fn query_product_dependencies_unresolved_advanced<S, F>(
        &self,
        search_paths: &[S],
        mut visit: F,
    ) -> Result<(), OperationError>
    where
        S: AsRef<str>,
        F: FnMut(&ProductDependencyEntry, &str) -> ControlFlow<()>,
    {
        if search_paths.is_empty() {
            return Ok(());
        }
        self.write(|db| {
            db.execute_batch(&format!(
                "CREATE TEMP TABLE {UNRESOLVED_SEARCH_TABLE} (search TEXT NOT NULL COLLATE NOCASE);"
            ))?;
            let insert = format!("INSERT INTO {UNRESOLVED_SEARCH_TABLE} (search) VALUES (:search);");
            for path in search_paths {
                db.execute(&insert, named_params! { ":search": path.as_ref() })?;
            }

            // Stored paths use `*` as the wildcard; any literal LIKE
            // metacharacters are escaped before the swap, as in
            // `asset_db_types::wildcard_to_like`.
            let select = format!(
                "SELECT ProductDependencies.*, {UNRESOLVED_SEARCH_TABLE}.search
                 FROM ProductDependencies
                 INNER JOIN {UNRESOLVED_SEARCH_TABLE}
                     ON (ProductDependencies.UnresolvedPath LIKE '%*%'
                         AND {UNRESOLVED_SEARCH_TABLE}.search LIKE REPLACE(REPLACE(REPLACE(REPLACE(
                             ProductDependencies.UnresolvedPath, '|', '||'), '%', '|%'), '_', '|_'),
                             '*', '%') ESCAPE '|')
                     OR {UNRESOLVED_SEARCH_TABLE}.search = ProductDependencies.UnresolvedPath
                 WHERE ProductDependencies.UnresolvedPath != ''
                 ORDER BY {UNRESOLVED_SEARCH_TABLE}.rowid, ProductDependencies.ProductDependencyID;"
            );
            db.query_each(
                &select,
                &[],
                |row| Ok((product_dependency_from_row(row)?, row.get::<_, String>(9)?)),
                |(entry, search)| visit(&entry, &search),
            )?;

            db.execute_batch(&format!("DROP TABLE {UNRESOLVED_SEARCH_TABLE};"))?;
            Ok(())
        })
    }

    /// Dependency rows of any product that point at a product of the given
    /// source.
    pub fn get_product_dependencies_that_depend_on_source_id(
        &self,
        source_id: i64,
    ) -> Result<Vec<ProductDependencyEntry>, OperationError> {
        Ok(self.db().query_vec(
            "SELECT ProductDependencies.* FROM Sources
             INNER JOIN ProductDependencies
                 ON Sources.SourceGuid = ProductDependencies.DependencySourceGuid
             INNER JOIN Products ON Products.ProductID = ProductDependencies.ProductPK
             WHERE Sources.SourceID = :sourceid
             ORDER BY ProductDependencies.ProductDependencyID;",
            named_params! { ":sourceid": source_id },
            product_dependency_from_row,
        )?)
    }
}

// ── Combined Queries ────────────────────────────────────────────────────────

impl AssetDatabaseConnection {
    /// Visit every product joined with its job, source and scan folder.
    ///
    /// With `include_legacy_sub_ids`, each entry also carries the legacy sub
    /// ids of its own product.
    pub fn query_combined<F>(
        &self,
        filter: &ProductFilter,
        include_legacy_sub_ids: bool,
        visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        self.combined_where("1 = 1", &[], filter, include_legacy_sub_ids, visit)
    }

    pub fn query_combined_by_source_id<F>(
        &self,
        source_id: i64,
        filter: &ProductFilter,
        include_legacy_sub_ids: bool,
        visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        self.combined_where(
            "Sources.SourceID = :sourceid",
            named_params! { ":sourceid": source_id },
            filter,
            include_legacy_sub_ids,
            visit,
        )
    }

    pub fn query_combined_by_job_id<F>(
        &self,
        job_id: i64,
        include_legacy_sub_ids: bool,
        visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        self.combined_where(
            "Jobs.JobID = :jobid",
            named_params! { ":jobid": job_id },
            &ProductFilter::any(),
            include_legacy_sub_ids,
            visit,
        )
    }

    pub fn query_combined_by_product_id<F>(
        &self,
        product_id: i64,
        include_legacy_sub_ids: bool,
        visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        self.combined_where(
            "Products.ProductID = :productid",
            named_params! { ":productid": product_id },
            &ProductFilter::any(),
            include_legacy_sub_ids,
            visit,
        )
    }

    pub fn query_combined_by_source_guid_product_sub_id<F>(
        &self,
        source_guid: Uuid,
        sub_id: u32,
        filter: &ProductFilter,
        include_legacy_sub_ids: bool,
        visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        self.combined_where(
            "Sources.SourceGuid = :sourceguid AND Products.SubID = :subid",
            named_params! { ":sourceguid": source_guid, ":subid": sub_id },
            filter,
            include_legacy_sub_ids,
            visit,
        )
    }

    pub fn query_combined_by_source_name<F>(
        &self,
        source_name: &str,
        filter: &ProductFilter,
        include_legacy_sub_ids: bool,
        visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        self.combined_where(
            "Sources.SourceName = :sourcename",
            named_params! { ":sourcename": source_name },
            filter,
            include_legacy_sub_ids,
            visit,
        )
    }

    pub fn query_combined_like_source_name<F>(
        &self,
        term: &str,
        like_type: LikeType,
        filter: &ProductFilter,
        include_legacy_sub_ids: bool,
        visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        let pattern = like_search_term(term, like_type);
        self.combined_where(
            "Sources.SourceName LIKE :sourcename ESCAPE '|'",
            named_params! { ":sourcename": pattern },
            filter,
            include_legacy_sub_ids,
            visit,
        )
    }

    pub fn query_combined_by_product_name<F>(
        &self,
        product_name: &str,
        filter: &ProductFilter,
        include_legacy_sub_ids: bool,
        visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        self.combined_where(
            "Products.ProductName = :productname",
            named_params! { ":productname": product_name },
            filter,
            include_legacy_sub_ids,
            visit,
        )
    }

    pub fn query_combined_like_product_name<F>(
        &self,
        term: &str,
        like_type: LikeType,
        filter: &ProductFilter,
        include_legacy_sub_ids: bool,
        visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        let pattern = like_search_term(term, like_type);
        self.combined_where(
            "Products.ProductName LIKE :productname ESCAPE '|'",
            named_params! { ":productname": pattern },
            filter,
            include_legacy_sub_ids,
            visit,
        )
    }

    /// Collect every combined row passing `filter`.
    pub fn get_combined(
        &self,
        filter: &ProductFilter,
        include_legacy_sub_ids: bool,
    ) -> Result<Vec<CombinedEntry>, OperationError> {
        let mut out = Vec::new();
        self.query_combined(filter, include_legacy_sub_ids, |entry| {
            out.push(entry.clone());
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    fn combined_where<F>(
        &self,
        predicate: &str,
        params: Params<'_>,
        filter: &ProductFilter,
        include_legacy_sub_ids: bool,
        mut visit: F,
    ) -> Result<(), OperationError>
    where
        F: FnMut(&CombinedEntry) -> ControlFlow<()>,
    {
        let db = self.db();
        let bound = filter.bind();
        let sql = format!(
            "SELECT ScanFolders.*, Sources.*, Jobs.*, Products.* FROM ScanFolders
             INNER JOIN Sources ON Sources.ScanFolderPK = ScanFolders.ScanFolderID
             INNER JOIN Jobs ON Jobs.SourcePK = Sources.SourceID
             INNER JOIN Products ON Products.JobPK = Jobs.JobID
             WHERE {predicate} AND {JOB_FILTER_SQL}
             ORDER BY Products.ProductID;"
        );
        db.query_each(
            &sql,
            &bound.params(params),
            |row| {
                let mut entry = combined_from_row(row)?;
                if include_legacy_sub_ids {
                    entry.legacy_sub_ids = legacy_sub_ids_for(&db, entry.product.product_id)?;
                }
                Ok(entry)
            },
            |entry| visit(&entry),
        )?;
        Ok(())
    }
}

fn legacy_sub_ids_for(
    db: &Db<'_>,
    product_id: i64,
) -> rusqlite::Result<Vec<asset_db_types::LegacySubIdEntry>> {
    db.query_vec(
        "SELECT * FROM LegacySubIDs WHERE ProductPK = :productpk ORDER BY LegacySubID;",
        named_params! { ":productpk": product_id },
        legacy_sub_id_from_row,
    )
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Row counts of the main tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatabaseStats {
    pub scan_folders: i64,
    pub sources: i64,
    pub jobs: i64,
    pub failed_jobs: i64,
    pub products: i64,
    pub product_dependencies: i64,
    pub unresolved_dependencies: i64,
    pub missing_dependencies: i64,
    pub source_dependencies: i64,
    pub files: i64,
    pub stats: i64,
}

impl AssetDatabaseConnection {
    /// Get overall database statistics.
    pub fn database_stats(&self) -> Result<DatabaseStats, OperationError> {
        let db = self.db();
        let count = |sql: &str| db.count(sql, &[]);
        Ok(DatabaseStats {
            scan_folders: count("SELECT COUNT(*) FROM ScanFolders;")?,
            sources: count("SELECT COUNT(*) FROM Sources;")?,
            jobs: count("SELECT COUNT(*) FROM Jobs;")?,
            failed_jobs: count("SELECT COUNT(*) FROM Jobs WHERE Status IN (2, 3);")?,
            products: count("SELECT COUNT(*) FROM Products;")?,
            product_dependencies: count("SELECT COUNT(*) FROM ProductDependencies;")?,
            unresolved_dependencies: count(
                "SELECT COUNT(*) FROM ProductDependencies WHERE UnresolvedPath != '';",
            )?,
            missing_dependencies: count("SELECT COUNT(*) FROM MissingProductDependencies;")?,
            source_dependencies: count("SELECT COUNT(*) FROM SourceDependency;")?,
            files: count("SELECT COUNT(*) FROM Files;")?,
            stats: count("SELECT COUNT(*) FROM Stats;")?,
        })
    }
}
