
use crate::database::gene_db::GeneDatabase;

/// Prints the statistics for a given database
/// # Arguments
/// * `database` - the database to print the statistics for
/// # Errors
/// * if any of the summary queries fail
pub fn print_stats(database: &GeneDatabase) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database metadata:");
    println!("\tBuild time: {}", database.build_timestamp()?);

    println!("Registry:");
    let authorities = database.list_authorities()?;
    println!("\tAuthorities: {}", authorities.len());
    for authority in &authorities {
        println!("\t\t{}: {}", authority.idx, authority.name);
    }
    let citations = database.list_citations()?;
    println!("\tCitations: {}", citations.len());
    for citation in &citations {
        println!("\t\t{}: {}", citation.idx, citation.name);
    }
    println!("\tSpecies: {} distinct taxa ({} name rows)",
        database.distinct_species_count()?,
        database.table_count("species")?
    );

    println!("Data tables:");
    println!("\tGene rows: {}", database.table_count("gene")?);
    println!("\tEquivalence rows: {}", database.table_count("gene_equivalence")?);
    println!("\tOrtholog membership rows: {}", database.table_count("gene_ortholog")?);

    let partitions = database.ortholog_partition_summary()?;
    if !partitions.is_empty() {
        println!("Ortholog partitions:");
        println!("\tauthority\tcitation\tgroups\tgenes");
        for (authority, citation, groups, genes) in &partitions {
            println!("\t{authority}\t{citation}\t{groups}\t{genes}");
        }
    }

    Ok(())
}
